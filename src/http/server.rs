//! HTTP server setup and the catch-all relay handler.
//!
//! # Responsibilities
//! - Create the Axum Router with a single handler for every method and path
//! - Route `Upgrade: websocket` requests to the echo bridge
//! - Relay every other request to the destination webhook
//! - Swap configuration atomically on reload
//! - Serve until shutdown

use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::{FromRequestParts, State, ws::WebSocketUpgrade},
    http::Request,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::RelayConfig;
use crate::http::request::{is_websocket_upgrade, read_snapshot};
use crate::http::websocket::{EchoBridge, SessionObserver, TracingObserver};
use crate::lifecycle::shutdown;
use crate::relay::{Relay, RelayResult};

/// Configuration and relay in effect for one invocation.
#[derive(Debug)]
pub struct InnerState {
    pub config: RelayConfig,
    pub relay: Relay,
}

impl InnerState {
    pub fn from_config(config: RelayConfig) -> RelayResult<Self> {
        let relay = Relay::from_config(&config)?;
        Ok(Self { config, relay })
    }
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub inner: Arc<ArcSwap<InnerState>>,
    pub observer: Arc<dyn SessionObserver>,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RelayConfig) -> RelayResult<Self> {
        Self::with_observer(config, Arc::new(TracingObserver))
    }

    /// Create a server whose WebSocket sessions report to `observer`.
    pub fn with_observer(
        config: RelayConfig,
        observer: Arc<dyn SessionObserver>,
    ) -> RelayResult<Self> {
        let inner = InnerState::from_config(config)?;
        let state = AppState {
            inner: Arc::new(ArcSwap::from_pointee(inner)),
            observer,
        };

        let router = Self::build_router(state.clone());
        Ok(Self { router, state })
    }

    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(relay_handler))
            .route("/", any(relay_handler))
            .with_state(state)
            .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
    }

    /// The router, for driving the server without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Replace the active configuration. Requests already running keep the
    /// one they started with.
    pub fn apply_config(&self, config: RelayConfig) -> RelayResult<()> {
        let inner = InnerState::from_config(config)?;
        self.state.inner.store(Arc::new(inner));
        Ok(())
    }

    /// Serve on `listener` until `shutdown_rx` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<RelayConfig>,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let webhook_host = {
            let inner = self.state.inner.load();
            inner.relay.dispatcher().url().host_str().map(str::to_owned)
        };
        tracing::info!(
            address = %addr,
            webhook_host = webhook_host.as_deref().unwrap_or(""),
            "HTTP server starting"
        );

        let state = self.state.clone();
        let reload_task = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                match InnerState::from_config(config) {
                    Ok(inner) => {
                        state.inner.store(Arc::new(inner));
                        tracing::info!("Configuration reloaded");
                    }
                    Err(e) => tracing::error!(error = %e, "Rejected reloaded configuration"),
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        reload_task.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: every method, every path.
async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let inner = state.inner.load_full();
    let request_id = Uuid::new_v4();

    if is_websocket_upgrade(request.headers()) {
        return upgrade(inner, state.observer.clone(), request_id, request).await;
    }

    let snapshot = match read_snapshot(
        request,
        inner.config.limits.max_body_size,
        &inner.config.listener.bind_address,
    )
    .await
    {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Failed to read request");
            return e.into_response();
        }
    };

    tracing::info!(
        request_id = %request_id,
        method = %snapshot.method,
        url = %snapshot.url,
        content_type = %snapshot.content_type,
        "Relaying request"
    );

    match inner.relay.relay_request(&snapshot).await {
        Ok(outcome) => outcome.into_response(),
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Relay failed");
            e.into_response()
        }
    }
}

/// Announce the upgrade, then hand the socket to the echo bridge.
async fn upgrade(
    inner: Arc<InnerState>,
    observer: Arc<dyn SessionObserver>,
    request_id: Uuid,
    request: Request<Body>,
) -> Response {
    let bridge = EchoBridge::new(inner.relay.clone(), observer);
    let session = bridge.session();
    let session_id = session.id();

    tracing::info!(
        request_id = %request_id,
        session_id = %session_id,
        "WebSocket upgrade requested"
    );

    if inner.config.websocket.notify_before_handshake {
        bridge.announce(session_id).await;
    } else {
        let bridge = bridge.clone();
        tokio::spawn(async move { bridge.announce(session_id).await });
    }

    let (mut parts, _body) = request.into_parts();
    let ws = match WebSocketUpgrade::from_request_parts(&mut parts, &()).await {
        Ok(ws) => ws,
        Err(rejection) => {
            tracing::warn!(
                request_id = %request_id,
                error = %rejection,
                "Invalid WebSocket handshake"
            );
            return rejection.into_response();
        }
    };

    ws.on_upgrade(move |socket| bridge.serve(session, socket))
}
