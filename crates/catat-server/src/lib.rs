//! Catat Web Server
//!
//! Axum-based REST API in front of the interpretation pipeline. One route per
//! input modality and domain; every internal failure is translated at this
//! boundary into a status code and message, so no panic or raw error ever
//! reaches the caller.

use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use catat_core::{Interpreter, ModelBackend};

mod handlers;

#[cfg(test)]
mod tests;

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

/// Shared application state
pub struct AppState {
    /// Interpretation pipeline; None when no model credential is configured.
    /// Requests against an unconfigured pipeline fail with a configuration
    /// error rather than a silent default.
    pub interpreter: Option<Interpreter>,
}

impl AppState {
    fn interpreter(&self) -> Result<&Interpreter, AppError> {
        self.interpreter.as_ref().ok_or_else(|| {
            AppError::internal("Model backend not configured (set GEMINI_API_KEY)")
        })
    }
}

/// Create the application router
pub fn create_router(interpreter: Option<Interpreter>, config: ServerConfig) -> Router {
    match interpreter {
        Some(ref client) => {
            info!(
                "Model backend configured: {} (model: {})",
                client.model().host(),
                client.model().model()
            );
        }
        None => {
            info!("Model backend not configured (set GEMINI_API_KEY to enable interpretation)");
        }
    }

    let cors = build_cors(&config.allowed_origins);
    let state = Arc::new(AppState { interpreter });

    Router::new()
        .route("/health", get(health))
        .route("/process_expense", post(handlers::process_expense))
        .route(
            "/process_image_expense",
            post(handlers::process_image_expense),
        )
        .route(
            "/process_expense_keuangan",
            post(handlers::process_expense_keuangan),
        )
        .route(
            "/process_image_expense_keuangan",
            post(handlers::process_image_expense_keuangan),
        )
        .route(
            "/process_voice_expense_keuangan",
            post(handlers::process_voice_expense_keuangan),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn build_cors(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        // Same-origin only
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// GET /health - liveness probe, no side effects
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "OK"}))
}

/// Bind and serve until the process is stopped
pub async fn serve(
    interpreter: Option<Interpreter>,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    axum::serve(listener, create_router(interpreter, config)).await?;
    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, message = %self.message, "Request failed");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

/// Translate pipeline errors into the route-level status contract:
/// the model's explicit rejection and bad caller data are 4xx; credential,
/// gateway, and extraction problems are 5xx. Per-field coercion fallbacks
/// never surface here at all.
impl From<catat_core::Error> for AppError {
    fn from(err: catat_core::Error) -> Self {
        use catat_core::Error as CoreError;

        match err {
            CoreError::Rejected(reason) => AppError::bad_request(&reason),
            CoreError::InvalidData(msg) => AppError::bad_request(&msg),
            other => AppError::internal(&other.to_string()),
        }
    }
}
