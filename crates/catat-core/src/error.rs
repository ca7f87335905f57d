//! Error types for Catat

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Model gateway error: {0}")]
    Gateway(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reply extraction error: {0}")]
    Extraction(String),

    /// The model explicitly declared the input invalid (e.g. "Error: ...").
    /// A caller problem, not a system failure.
    #[error("Input rejected: {0}")]
    Rejected(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
