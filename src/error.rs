//! Error types for ClipNest.

use thiserror::Error;

/// Library-level error type for ClipNest operations.
#[derive(Error, Debug)]
pub enum ClipnestError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("Similarity search failed: {0}")]
    Search(String),

    #[error("Completion stream failed: {0}")]
    Completion(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),
}

/// Result type alias for ClipNest operations.
pub type Result<T> = std::result::Result<T, ClipnestError>;
