//! HTTP request handlers organized by domain
//!
//! Each submodule contains the handlers for one record domain; the request
//! DTOs are shared because every domain accepts the same input shapes.

use serde::Deserialize;

pub mod financial;
pub mod metal;

pub use financial::*;
pub use metal::*;

/// Body for the free-text routes
#[derive(Debug, Deserialize)]
pub struct ExpenseTextRequest {
    pub text: String,
}

/// Body for the receipt-image routes
#[derive(Debug, Deserialize)]
pub struct ReceiptImageRequest {
    /// Base64-encoded JPEG
    pub image: String,
    /// Sender's caption, used as a category/goal hint
    #[serde(default)]
    pub caption: String,
}

/// Body for the voice route
#[derive(Debug, Deserialize)]
pub struct VoiceNoteRequest {
    /// Base64-encoded mp3
    pub file_base64: String,
}

/// The pipeline resolves relative dates and clamps future ones against this.
pub(crate) fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}
