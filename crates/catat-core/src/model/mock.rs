//! Mock backend for testing
//!
//! Returns scripted replies for all generation operations and records the
//! prompts it was handed, so tests can drive the full pipeline without a
//! network.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::Result;

use super::ModelBackend;

/// Mock model backend
///
/// Replies are served from a FIFO queue; when the queue is empty an empty
/// JSON object is returned, which coerces to an all-defaults record.
#[derive(Clone, Default)]
pub struct MockBackend {
    replies: Arc<Mutex<VecDeque<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    /// Whether health_check should return true
    healthy: bool,
}

impl MockBackend {
    /// Create a new mock backend (healthy by default)
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            healthy: true,
        }
    }

    /// Create a mock that serves one scripted reply
    pub fn with_reply(reply: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.push_reply(reply);
        mock
    }

    /// Queue another scripted reply
    pub fn push_reply(&self, reply: impl Into<String>) {
        self.replies
            .lock()
            .expect("mock reply queue poisoned")
            .push_back(reply.into());
    }

    /// Prompts observed so far, in call order
    pub fn seen_prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .expect("mock prompt log poisoned")
            .clone()
    }

    fn next_reply(&self, prompt: &str) -> String {
        self.prompts
            .lock()
            .expect("mock prompt log poisoned")
            .push(prompt.to_string());
        self.replies
            .lock()
            .expect("mock reply queue poisoned")
            .pop_front()
            .unwrap_or_else(|| "{}".to_string())
    }
}

#[async_trait]
impl ModelBackend for MockBackend {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        Ok(self.next_reply(prompt))
    }

    async fn generate_with_image(&self, prompt: &str, _image_base64: &str) -> Result<String> {
        Ok(self.next_reply(prompt))
    }

    async fn generate_with_audio(
        &self,
        prompt: &str,
        _audio: &[u8],
        _mime_type: &str,
    ) -> Result<String> {
        Ok(self.next_reply(prompt))
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
