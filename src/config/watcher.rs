//! Configuration file watcher for hot reload.
//!
//! Only the new webhook URL, limits and WebSocket settings take effect on
//! reload; the listener stays bound to its original address.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::RelayConfig;

/// Watches one config file and forwards every valid revision.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<RelayConfig>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end for new configurations.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<RelayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            update_tx,
        };
        (watcher, update_rx)
    }

    /// Start watching. Dropping the returned handle stops the watch.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self { path, update_tx } = self;
        let reload_path = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if is_content_change(&event.kind) => {
                    reload(&reload_path, &update_tx);
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?path, "Config watcher started");
        Ok(watcher)
    }
}

fn is_content_change(kind: &EventKind) -> bool {
    kind.is_modify() || kind.is_create()
}

/// Load `path`; a file that fails to parse or validate is logged and skipped.
fn reload(path: &Path, update_tx: &mpsc::UnboundedSender<RelayConfig>) {
    tracing::info!(path = ?path, "Config file changed, reloading");
    match load_config(path) {
        Ok(config) => {
            if update_tx.send(config).is_err() {
                tracing::debug!("Config receiver dropped");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Rejected new configuration, keeping current one");
        }
    }
}
