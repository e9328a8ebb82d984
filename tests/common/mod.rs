//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use intake_gateway::{GatewayConfig, HttpServer, Shutdown};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A running gateway bound to an ephemeral port.
pub struct Gateway {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl Gateway {
    pub fn url(&self) -> String {
        format!("http://{}/api/contact", self.addr)
    }
}

/// Config suitable for tests: loopback bind, short delivery timeout.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.delivery.timeout_secs = 1;
    config
}

pub async fn start_gateway(server: HttpServer) -> Gateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (_, config_updates) = mpsc::unbounded_channel();
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, config_updates, server_shutdown).await });

    Gateway {
        addr,
        shutdown,
        handle,
    }
}

/// Programmable webhook receiver recording every body it is sent.
#[derive(Clone)]
pub struct MockWebhook {
    pub addr: SocketAddr,
    pub hits: Arc<AtomicU32>,
    pub bodies: Arc<Mutex<Vec<Value>>>,
}

impl MockWebhook {
    pub fn url(&self) -> String {
        format!("http://{}/hook", self.addr)
    }

    pub fn hits(&self) -> u32 {
        self.hits.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
struct WebhookState {
    status: StatusCode,
    delay: Duration,
    mock: MockWebhook,
}

pub async fn start_webhook(status: StatusCode, delay: Duration) -> MockWebhook {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mock = MockWebhook {
        addr: listener.local_addr().unwrap(),
        hits: Arc::new(AtomicU32::new(0)),
        bodies: Arc::new(Mutex::new(Vec::new())),
    };

    let state = WebhookState {
        status,
        delay,
        mock: mock.clone(),
    };
    let app = Router::new()
        .route("/hook", post(receive))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    mock
}

async fn receive(State(state): State<WebhookState>, Json(body): Json<Value>) -> StatusCode {
    state.mock.hits.fetch_add(1, Ordering::SeqCst);
    state.mock.bodies.lock().unwrap().push(body);
    tokio::time::sleep(state.delay).await;
    state.status
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
