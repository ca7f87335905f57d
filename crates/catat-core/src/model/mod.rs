//! Generative-model gateway abstraction
//!
//! # Architecture
//!
//! - `ModelBackend` trait: the three generation operations the pipelines need
//! - `ModelClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `GeminiBackend`, `MockBackend`
//!
//! # Configuration
//!
//! Environment variables:
//! - `MODEL_BACKEND`: Backend to use (gemini, mock). Default: gemini
//! - `GEMINI_API_KEY`: Credential for the Gemini backend (required)
//! - `GEMINI_MODEL`: Model name (default: gemini-1.5-flash)
//! - `GEMINI_BASE_URL`: API base URL override (used by tests)

mod gemini;
mod mock;

pub use gemini::GeminiBackend;
pub use mock::MockBackend;

use async_trait::async_trait;

use crate::error::Result;

/// Trait defining the interface for all model backends
///
/// Each operation issues one synchronous request (the audio variant two: the
/// upload must succeed before generation is attempted) and returns the raw
/// reply text. Reply interpretation belongs to the extraction layer, not
/// here.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    /// Generate from a text-only prompt
    async fn generate_text(&self, prompt: &str) -> Result<String>;

    /// Generate from a prompt plus an inline base64 JPEG
    async fn generate_with_image(&self, prompt: &str, image_base64: &str) -> Result<String>;

    /// Generate from a prompt plus an uploaded media blob.
    /// Two-step: upload first, then generate against the returned handle.
    async fn generate_with_audio(
        &self,
        prompt: &str,
        audio: &[u8],
        mime_type: &str,
    ) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the host URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete model client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum ModelClient {
    /// Gemini REST backend
    Gemini(GeminiBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl ModelClient {
    /// Create a model client from environment variables
    ///
    /// Returns None when the selected backend is not configured (e.g. no
    /// `GEMINI_API_KEY`); callers surface that as a configuration error at
    /// request time rather than defaulting silently.
    pub fn from_env() -> Option<Self> {
        let backend = std::env::var("MODEL_BACKEND").unwrap_or_else(|_| "gemini".to_string());

        match backend.to_lowercase().as_str() {
            "gemini" => GeminiBackend::from_env().map(ModelClient::Gemini),
            "mock" => Some(ModelClient::Mock(MockBackend::new())),
            _ => {
                tracing::warn!(backend = %backend, "Unknown MODEL_BACKEND, falling back to gemini");
                GeminiBackend::from_env().map(ModelClient::Gemini)
            }
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        ModelClient::Mock(MockBackend::new())
    }
}

#[async_trait]
impl ModelBackend for ModelClient {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        match self {
            ModelClient::Gemini(b) => b.generate_text(prompt).await,
            ModelClient::Mock(b) => b.generate_text(prompt).await,
        }
    }

    async fn generate_with_image(&self, prompt: &str, image_base64: &str) -> Result<String> {
        match self {
            ModelClient::Gemini(b) => b.generate_with_image(prompt, image_base64).await,
            ModelClient::Mock(b) => b.generate_with_image(prompt, image_base64).await,
        }
    }

    async fn generate_with_audio(
        &self,
        prompt: &str,
        audio: &[u8],
        mime_type: &str,
    ) -> Result<String> {
        match self {
            ModelClient::Gemini(b) => b.generate_with_audio(prompt, audio, mime_type).await,
            ModelClient::Mock(b) => b.generate_with_audio(prompt, audio, mime_type).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            ModelClient::Gemini(b) => b.health_check().await,
            ModelClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            ModelClient::Gemini(b) => b.model(),
            ModelClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            ModelClient::Gemini(b) => b.host(),
            ModelClient::Mock(b) => b.host(),
        }
    }
}
