//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{body::Bytes, extract::State, http::{HeaderMap, StatusCode}, routing::post, Router};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use webhook_relay::config::RelayConfig;
use webhook_relay::http::{HttpServer, SessionObserver};
use webhook_relay::lifecycle::Shutdown;

/// One request received by the mock webhook.
#[derive(Debug, Clone)]
pub struct Captured {
    pub content_type: String,
    pub body: String,
}

impl Captured {
    /// The `payload_json` part, parsed.
    pub fn payload(&self) -> serde_json::Value {
        let start = self
            .body
            .find("name=\"payload_json\"")
            .expect("payload_json part");
        let rest = &self.body[start..];
        let json_start = rest.find("\r\n\r\n").expect("part header end") + 4;
        let json_end = rest[json_start..].find("\r\n--").expect("part end") + json_start;
        serde_json::from_str(&rest[json_start..json_end]).expect("payload_json is JSON")
    }

    pub fn has_attachment(&self, name: &str) -> bool {
        self.body.contains("name=\"files[]\"")
            && self.body.contains(&format!("filename=\"{}\"", name))
    }
}

/// Programmable stand-in for the destination webhook.
#[derive(Clone)]
pub struct MockWebhook {
    pub addr: SocketAddr,
    received: Arc<Mutex<Vec<Captured>>>,
    status: Arc<Mutex<StatusCode>>,
}

impl MockWebhook {
    pub fn url(&self) -> String {
        format!("http://{}/api/webhooks/1/token", self.addr)
    }

    pub fn set_status(&self, status: StatusCode) {
        *self.status.lock().unwrap() = status;
    }

    pub fn received(&self) -> Vec<Captured> {
        self.received.lock().unwrap().clone()
    }

    /// Wait until at least `count` requests arrived.
    pub async fn wait_for(&self, count: usize) -> Vec<Captured> {
        for _ in 0..100 {
            let received = self.received();
            if received.len() >= count {
                return received;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.received()
    }
}

/// Start a mock webhook answering 204 until told otherwise.
pub async fn start_mock_webhook() -> MockWebhook {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mock = MockWebhook {
        addr: listener.local_addr().unwrap(),
        received: Arc::new(Mutex::new(Vec::new())),
        status: Arc::new(Mutex::new(StatusCode::NO_CONTENT)),
    };

    async fn capture(
        State(mock): State<MockWebhook>,
        headers: HeaderMap,
        body: Bytes,
    ) -> StatusCode {
        mock.received.lock().unwrap().push(Captured {
            content_type: headers
                .get("content-type")
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
        *mock.status.lock().unwrap()
    }

    let app = Router::new()
        .route("/api/webhooks/{id}/{token}", post(capture))
        .with_state(mock.clone());

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    mock
}

/// Relay config pointing at the mock webhook.
pub fn relay_config(webhook: &MockWebhook) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.webhook.url = webhook.url();
    config.webhook.timeout_secs = Some(10);
    config.webhook.no_proxy = true;
    config
}

/// Start the relay on an ephemeral port. Keep the `Shutdown` alive.
#[allow(dead_code)]
pub async fn start_relay(config: RelayConfig) -> (SocketAddr, Shutdown) {
    start_relay_with(HttpServer::new(config).unwrap()).await
}

#[allow(dead_code)]
pub async fn start_relay_observed(
    config: RelayConfig,
    observer: Arc<dyn SessionObserver>,
) -> (SocketAddr, Shutdown) {
    start_relay_with(HttpServer::with_observer(config, observer).unwrap()).await
}

async fn start_relay_with(server: HttpServer) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let (_, config_updates) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        let _ = server.run(listener, config_updates, server_shutdown).await;
    });

    (addr, shutdown)
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
