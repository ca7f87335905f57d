//! Catat Core Library
//!
//! Shared functionality for the Catat transaction-capture service:
//! - Model gateway for the Gemini generateContent API (text, vision, audio)
//! - Versioned prompt library with data-dir overrides
//! - Reply extraction (fenced JSON, key:value lines, batch envelopes)
//! - Field coercion with guaranteed defaults
//! - Domain profiles (financial transactions, precious-metal purchases)
//! - Interpretation pipeline tying the pieces together

pub mod coerce;
pub mod error;
pub mod extract;
pub mod interpreter;
pub mod model;
pub mod models;
pub mod profile;
pub mod prompts;

/// Test utilities including the mock Gemini server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{Error, Result};
pub use extract::Payload;
pub use interpreter::{assemble, Interpreter, AUDIO_MIME_TYPE};
pub use model::{GeminiBackend, MockBackend, ModelBackend, ModelClient};
pub use models::{BatchOutcome, MetalPurchaseRecord, TransactionRecord, TransactionType};
pub use profile::{DomainProfile, Financial, PreciousMetal, SourceVariant, TextReplyFormat};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
