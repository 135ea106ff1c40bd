//! In-process stub of the cluster API for tests.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::Notify;

use crate::auth::{Credentials, Token};
use crate::config::ApiConfig;

/// Behaviour of the stub's `/api/v1/nodes` route for authorized requests.
#[derive(Clone)]
pub(crate) enum NodesReply {
    Items(Vec<Value>),
    Status(StatusCode, String),
    Raw(String),
}

pub(crate) struct StubBackend {
    accepted: Vec<String>,
    nodes: NodesReply,
    delay: Option<Duration>,
    /// Signalled when a probe request arrives
    pub probe_received: Arc<Notify>,
    /// When set, probes wait for this before answering
    pub probe_release: Option<Arc<Notify>>,
}

impl StubBackend {
    pub fn accepting(users: &[(&str, &str)]) -> Self {
        Self {
            accepted: users
                .iter()
                .map(|(u, p)| Token::from_credentials(&Credentials::new(*u, *p)).authorization_header())
                .collect(),
            nodes: NodesReply::Items(Vec::new()),
            delay: None,
            probe_received: Arc::new(Notify::new()),
            probe_release: None,
        }
    }

    pub fn with_nodes(mut self, nodes: NodesReply) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Hold probe answers until the returned handle is notified.
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let release = Arc::new(Notify::new());
        self.probe_release = Some(release.clone());
        (self, release)
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| self.accepted.iter().any(|a| a == v))
            .unwrap_or(false)
    }

    /// Serve on a random local port and return a config pointing at it.
    pub async fn serve(self) -> ApiConfig {
        let app = Router::new()
            .route("/api/v1/", get(probe))
            .route("/api/v1/nodes", get(list_nodes))
            .with_state(Arc::new(self));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub listener");
        let addr = listener.local_addr().expect("Stub listener has no address");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        ApiConfig::new(format!("http://{}", addr), 2000)
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "kind": "Status",
            "apiVersion": "v1",
            "status": "Failure",
            "message": "Unauthorized",
            "reason": "Unauthorized",
            "code": 401
        })),
    )
        .into_response()
}

async fn probe(State(stub): State<Arc<StubBackend>>, headers: HeaderMap) -> Response {
    stub.probe_received.notify_one();
    if let Some(release) = &stub.probe_release {
        release.notified().await;
    }
    if let Some(delay) = stub.delay {
        tokio::time::sleep(delay).await;
    }
    if !stub.authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"kind": "APIResourceList", "groupVersion": "v1", "resources": []})).into_response()
}

async fn list_nodes(State(stub): State<Arc<StubBackend>>, headers: HeaderMap) -> Response {
    if let Some(delay) = stub.delay {
        tokio::time::sleep(delay).await;
    }
    if !stub.authorized(&headers) {
        return unauthorized();
    }
    match &stub.nodes {
        NodesReply::Items(items) => Json(json!({
            "kind": "NodeList",
            "apiVersion": "v1",
            "metadata": {"resourceVersion": "42"},
            "items": items
        }))
        .into_response(),
        NodesReply::Status(status, body) => (*status, body.clone()).into_response(),
        NodesReply::Raw(body) => (StatusCode::OK, body.clone()).into_response(),
    }
}

/// Backend that answers the first request with a 401 whose body never
/// finishes. The returned notify fires once the headers are written.
pub(crate) async fn stalled_rejection_config() -> (ApiConfig, Arc<Notify>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stalled listener");
    let addr = listener.local_addr().expect("Listener has no address");
    let headers_sent = Arc::new(Notify::new());

    let notify = headers_sent.clone();
    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };
        let mut request = [0u8; 4096];
        let _ = socket.read(&mut request).await;
        let _ = socket
            .write_all(
                b"HTTP/1.1 401 Unauthorized\r\ncontent-type: application/json\r\ncontent-length: 4096\r\n\r\n{\"kind\":",
            )
            .await;
        notify.notify_one();
        // Keep the connection open without sending the rest of the body
        tokio::time::sleep(Duration::from_secs(60)).await;
        drop(socket);
    });

    (ApiConfig::new(format!("http://{}", addr), 30_000), headers_sent)
}

/// Config for a local port nothing listens on.
pub(crate) async fn unreachable_config() -> ApiConfig {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let addr = listener.local_addr().expect("Listener has no address");
    drop(listener);
    ApiConfig::new(format!("http://{}", addr), 2000)
}

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
