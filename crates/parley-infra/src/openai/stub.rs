//! Local stand-in for the OpenAI API, used by the adapter tests.
//!
//! Serves one canned response on one path and records the last request it
//! received. Can hold each response back to imitate a slow upstream.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::post;

#[derive(Debug, Clone, Default)]
pub struct Captured {
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl Captured {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).unwrap()
    }
}

#[derive(Clone)]
struct StubState {
    status: StatusCode,
    content_type: &'static str,
    body: Vec<u8>,
    delay: Arc<Mutex<Duration>>,
    captured: Arc<Mutex<Option<Captured>>>,
}

pub struct StubServer {
    pub base_url: String,
    delay: Arc<Mutex<Duration>>,
    captured: Arc<Mutex<Option<Captured>>>,
}

impl StubServer {
    /// Serve `body` with `status` for POSTs to `/v1{path}`.
    pub async fn start(
        path: &str,
        status: u16,
        content_type: &'static str,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        let captured = Arc::new(Mutex::new(None));
        let delay = Arc::new(Mutex::new(Duration::ZERO));
        let state = StubState {
            status: StatusCode::from_u16(status).unwrap(),
            content_type,
            body: body.into(),
            delay: Arc::clone(&delay),
            captured: Arc::clone(&captured),
        };
        let app = Router::new()
            .route(&format!("/v1{path}"), post(handle))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/v1"),
            delay,
            captured,
        }
    }

    /// Wait `delay` before answering each request.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = delay;
        self
    }

    pub fn captured(&self) -> Captured {
        self.captured
            .lock()
            .unwrap()
            .clone()
            .expect("stub received no request")
    }
}

async fn handle(State(state): State<StubState>, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let read = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    *state.captured.lock().unwrap() = Some(Captured {
        authorization: read(header::AUTHORIZATION),
        content_type: read(header::CONTENT_TYPE),
        body: body.to_vec(),
    });
    let delay = *state.delay.lock().unwrap();
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    (
        state.status,
        [(header::CONTENT_TYPE, state.content_type)],
        state.body,
    )
}
