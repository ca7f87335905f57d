//! Test utilities for catat-core
//!
//! Provides a mock Gemini server speaking just enough of the
//! generateContent/file-upload surface to exercise the gateway end to end in
//! integration tests.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use tokio::sync::oneshot;

#[derive(Default)]
struct ServerState {
    replies: Mutex<VecDeque<String>>,
    upload_count: AtomicUsize,
    generate_count: AtomicUsize,
    fail_upload: bool,
    fail_generate: bool,
}

/// Mock Gemini server for testing
pub struct MockGeminiServer {
    addr: SocketAddr,
    state: Arc<ServerState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockGeminiServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        Self::start_with(ServerState::default()).await
    }

    /// Start a server whose upload endpoint always returns 500
    pub async fn start_failing_uploads() -> Self {
        Self::start_with(ServerState {
            fail_upload: true,
            ..Default::default()
        })
        .await
    }

    /// Start a server whose generate endpoint always returns 500
    pub async fn start_failing_generate() -> Self {
        Self::start_with(ServerState {
            fail_generate: true,
            ..Default::default()
        })
        .await
    }

    async fn start_with(state: ServerState) -> Self {
        let state = Arc::new(state);
        let app = Router::new()
            .route("/upload/v1beta/files", post(handle_upload))
            .route("/v1beta/models/:model", post(handle_generate))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Queue the text the next generate call replies with
    pub fn push_reply(&self, text: impl Into<String>) {
        self.state
            .replies
            .lock()
            .unwrap()
            .push_back(text.into());
    }

    /// Number of upload calls observed
    pub fn upload_count(&self) -> usize {
        self.state.upload_count.load(Ordering::SeqCst)
    }

    /// Number of generate calls observed
    pub fn generate_count(&self) -> usize {
        self.state.generate_count.load(Ordering::SeqCst)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockGeminiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// File upload endpoint: hands back an opaque file reference
async fn handle_upload(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    state.upload_count.fetch_add(1, Ordering::SeqCst);
    if state.fail_upload {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "upload exploded"})),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "file": {
                "uri": "https://mock.local/v1beta/files/mock-123",
                "name": "files/mock-123"
            }
        })),
    )
}

/// generateContent endpoint: wraps the queued reply in the candidates envelope
async fn handle_generate(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    state.generate_count.fetch_add(1, Ordering::SeqCst);
    if state.fail_generate {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "model unavailable"})),
        );
    }
    let reply = state
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| "{}".to_string());
    (
        StatusCode::OK,
        Json(json!({
            "candidates": [
                {"content": {"parts": [{"text": reply}]}}
            ]
        })),
    )
}
