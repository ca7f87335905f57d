//! Gemini backend implementation
//!
//! HTTP client for the generativelanguage REST API. Text prompts go straight
//! to `generateContent`; images ride along as inline data; audio takes the
//! two-step route: upload the blob to the file endpoint, then generate
//! against the returned file URI. The upload must succeed before generation
//! is attempted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

use super::ModelBackend;

/// Production API base URL
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model when GEMINI_MODEL is not set
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Timeout for text-only generation
const TEXT_TIMEOUT: Duration = Duration::from_secs(30);

/// Timeout for media upload and media-carrying generation
const MEDIA_TIMEOUT: Duration = Duration::from_secs(60);

/// Gemini backend
#[derive(Clone)]
pub struct GeminiBackend {
    http_client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiBackend {
    /// Create a new Gemini backend
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    /// Create from environment variables. Returns None without a credential.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty())?;
        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Some(Self::new(&base_url, &api_key, &model))
    }

    /// One generateContent call; returns the reply text verbatim.
    async fn generate(&self, parts: Vec<Part>, timeout: Duration) -> Result<String> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let request = GenerateRequest {
            contents: vec![Content { parts }],
        };

        let response = self
            .http_client
            .post(&url)
            .timeout(timeout)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Gateway(format!(
                "generateContent failed (status {}): {}",
                status, body
            )));
        }

        let body: GenerateResponse = response.json().await?;
        let text = body
            .candidates
            .unwrap_or_default()
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().find_map(|p| p.text))
            .ok_or_else(|| Error::Gateway("model returned no text candidate".to_string()))?;

        debug!(model = %self.model, "Gemini reply: {}", text);
        Ok(text)
    }

    /// Upload a media blob to the file endpoint; returns the file URI used
    /// to reference the blob in a follow-up generate call.
    async fn upload_media(&self, bytes: &[u8], mime_type: &str) -> Result<String> {
        let url = format!("{}/upload/v1beta/files?key={}", self.base_url, self.api_key);

        let response = self
            .http_client
            .post(&url)
            .timeout(MEDIA_TIMEOUT)
            .header("X-Goog-Upload-Protocol", "raw")
            .header(reqwest::header::CONTENT_TYPE, mime_type)
            .body(bytes.to_vec())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Gateway(format!(
                "media upload failed (status {}): {}",
                status, body
            )));
        }

        let body: UploadResponse = response.json().await?;
        debug!(uri = %body.file.uri, "Uploaded media blob");
        Ok(body.file.uri)
    }
}

/// Request to the generateContent endpoint
#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

/// One content part: text, inline media, or an uploaded-file reference
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file_data: Option<FileData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
            file_data: None,
        }
    }

    fn inline_jpeg(data_base64: &str) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: "image/jpeg".to_string(),
                data: data_base64.to_string(),
            }),
            file_data: None,
        }
    }

    fn file(uri: &str, mime_type: &str) -> Self {
        Self {
            text: None,
            inline_data: None,
            file_data: Some(FileData {
                mime_type: mime_type.to_string(),
                file_uri: uri.to_string(),
            }),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileData {
    mime_type: String,
    file_uri: String,
}

/// Response from the generateContent endpoint
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

/// Response from the file upload endpoint
#[derive(Debug, Deserialize)]
struct UploadResponse {
    file: UploadedFile,
}

#[derive(Debug, Deserialize)]
struct UploadedFile {
    uri: String,
}

#[async_trait]
impl ModelBackend for GeminiBackend {
    async fn generate_text(&self, prompt: &str) -> Result<String> {
        self.generate(vec![Part::text(prompt)], TEXT_TIMEOUT).await
    }

    async fn generate_with_image(&self, prompt: &str, image_base64: &str) -> Result<String> {
        self.generate(
            vec![Part::text(prompt), Part::inline_jpeg(image_base64)],
            MEDIA_TIMEOUT,
        )
        .await
    }

    async fn generate_with_audio(
        &self,
        prompt: &str,
        audio: &[u8],
        mime_type: &str,
    ) -> Result<String> {
        // Upload first; a failed upload aborts before any generate call.
        let uri = self.upload_media(audio, mime_type).await?;
        self.generate(
            vec![Part::text(prompt), Part::file(&uri, mime_type)],
            MEDIA_TIMEOUT,
        )
        .await
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/v1beta/models?key={}", self.base_url, self.api_key);
        match self.http_client.get(&url).send().await {
            Ok(resp) => resp.status().is_success(),
            Err(_) => false,
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_serialization_shapes() {
        let text = serde_json::to_value(Part::text("hello")).unwrap();
        assert_eq!(text, serde_json::json!({"text": "hello"}));

        let image = serde_json::to_value(Part::inline_jpeg("QUJD")).unwrap();
        assert_eq!(
            image,
            serde_json::json!({"inlineData": {"mimeType": "image/jpeg", "data": "QUJD"}})
        );

        let file = serde_json::to_value(Part::file("files/abc", "audio/mp3")).unwrap();
        assert_eq!(
            file,
            serde_json::json!({"fileData": {"mimeType": "audio/mp3", "fileUri": "files/abc"}})
        );
    }

    #[test]
    fn test_generate_response_text_extraction() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "the reply"}]}}
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        let text = parsed
            .candidates
            .unwrap()
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().find_map(|p| p.text))
            .unwrap();
        assert_eq!(text, "the reply");
    }

    #[test]
    fn test_from_env_requires_key() {
        // An empty credential counts as absent
        std::env::set_var("GEMINI_API_KEY", "");
        assert!(GeminiBackend::from_env().is_none());
    }
}
