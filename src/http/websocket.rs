//! WebSocket echo bridge.
//!
//! # Session Lifecycle
//! ```text
//! Upgrading ──(handshake done)──▶ Open ──(close frame / stream end)──▶ Closed
//!     │                            │
//!     └─ "Websocket request        └─ per text message:
//!         received" dispatched         dispatch notification, then send "Echo: {msg}"
//! ```
//!
//! # Design Decisions
//! - Each session owns its own handler; nothing is shared between sessions
//! - Dispatch failures are logged through the observer, never sent to the peer
//! - Closing performs local bookkeeping only
//! - Binary frames are ignored; ping/pong is answered by axum

use std::fmt;
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use uuid::Uuid;

use crate::observability::metrics;
use crate::relay::{DispatchOutcome, Relay, RelayResult};

/// Unique identifier for one upgraded connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ws-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Upgrading,
    Open,
    Closed,
}

/// Sink for session events. Injected into the bridge so callers choose
/// where bookkeeping goes.
pub trait SessionObserver: Send + Sync + 'static {
    fn session_opened(&self, _id: SessionId) {}
    fn message_received(&self, _id: SessionId, _message: &str) {}
    fn dispatch_failed(&self, _id: SessionId, _reason: &str) {}
    fn session_closed(&self, _id: SessionId) {}
}

/// Writes session events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl SessionObserver for TracingObserver {
    fn session_opened(&self, id: SessionId) {
        tracing::info!(session_id = %id, "WebSocket session opened");
    }

    fn message_received(&self, id: SessionId, message: &str) {
        tracing::debug!(session_id = %id, len = message.len(), "WebSocket message received");
    }

    fn dispatch_failed(&self, id: SessionId, reason: &str) {
        tracing::warn!(session_id = %id, reason = %reason, "WebSocket notification not delivered");
    }

    fn session_closed(&self, id: SessionId) {
        tracing::info!(session_id = %id, "WebSocket connection closed");
    }
}

/// State of one connection, driven only by its own events.
pub struct Session {
    id: SessionId,
    state: SessionState,
    observer: Arc<dyn SessionObserver>,
}

impl Session {
    pub fn new(observer: Arc<dyn SessionObserver>) -> Self {
        Self {
            id: SessionId::new(),
            state: SessionState::Upgrading,
            observer,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    fn open(&mut self) {
        if self.state == SessionState::Upgrading {
            self.state = SessionState::Open;
            metrics::session_opened();
            self.observer.session_opened(self.id);
        }
    }

    fn close(&mut self) {
        if self.state == SessionState::Open {
            metrics::session_closed();
        }
        if self.state != SessionState::Closed {
            self.state = SessionState::Closed;
            self.observer.session_closed(self.id);
        }
    }
}

/// Reply sent back to the peer for each text message.
pub fn echo_reply(message: &str) -> String {
    format!("Echo: {}", message)
}

/// Turns socket events into notifications and echoes.
#[derive(Clone)]
pub struct EchoBridge {
    relay: Relay,
    observer: Arc<dyn SessionObserver>,
}

impl EchoBridge {
    pub fn new(relay: Relay, observer: Arc<dyn SessionObserver>) -> Self {
        Self { relay, observer }
    }

    /// Start a session in the `Upgrading` state.
    pub fn session(&self) -> Session {
        Session::new(self.observer.clone())
    }

    /// Announce the upgrade to the destination. Failures are only observed.
    pub async fn announce(&self, id: SessionId) {
        let result = self.relay.notify_upgrade().await;
        self.observe(id, result);
    }

    /// Drive an upgraded socket until the peer goes away.
    pub async fn serve(self, mut session: Session, mut socket: WebSocket) {
        session.open();

        while let Some(frame) = socket.recv().await {
            match frame {
                Ok(Message::Text(text)) => {
                    let message = text.as_str();
                    self.observer.message_received(session.id, message);

                    let result = self.relay.relay_socket_message(message).await;
                    self.observe(session.id, result);

                    if let Err(e) = socket.send(Message::Text(echo_reply(message).into())).await {
                        tracing::debug!(session_id = %session.id, error = %e, "Echo send failed");
                        break;
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!(
                        session_id = %session.id,
                        error = %e,
                        "WebSocket receive error"
                    );
                    break;
                }
            }
        }

        session.close();
    }

    fn observe(&self, id: SessionId, result: RelayResult<DispatchOutcome>) {
        match result {
            Ok(DispatchOutcome::Delivered) => {}
            Ok(DispatchOutcome::Rejected { status, status_text }) => {
                self.observer
                    .dispatch_failed(id, &format!("{} {}", status.as_u16(), status_text));
            }
            Err(e) => self.observer.dispatch_failed(id, &e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        events: Mutex<Vec<String>>,
    }

    impl SessionObserver for Recorder {
        fn session_opened(&self, _id: SessionId) {
            self.events.lock().unwrap().push("opened".into());
        }

        fn session_closed(&self, _id: SessionId) {
            self.events.lock().unwrap().push("closed".into());
        }
    }

    #[test]
    fn test_session_state_machine() {
        let recorder = Arc::new(Recorder::default());
        let mut session = Session::new(recorder.clone());
        assert_eq!(session.state(), SessionState::Upgrading);

        session.open();
        assert_eq!(session.state(), SessionState::Open);

        session.close();
        session.close();
        assert_eq!(session.state(), SessionState::Closed);

        // Closed is terminal.
        session.open();
        assert_eq!(session.state(), SessionState::Closed);

        assert_eq!(*recorder.events.lock().unwrap(), vec!["opened", "closed"]);
    }

    #[test]
    fn test_session_ids_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
        assert!(SessionId::new().to_string().starts_with("ws-"));
    }

    #[test]
    fn test_echo_reply() {
        assert_eq!(echo_reply("hi"), "Echo: hi");
    }
}
