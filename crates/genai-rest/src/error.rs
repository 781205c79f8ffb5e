//! Error types for the Generative Language API client.

use thiserror::Error;

/// Errors that can occur when calling the Generative Language API.
#[derive(Debug, Error)]
pub enum GenAiError {
    /// No API key was provided
    #[error("missing API key (set GEMINI_API_KEY or configure one in settings)")]
    MissingApiKey,

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body or structured payload
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The response carried no inline image payload
    #[error("response contained no image payload")]
    NoImagePayload,

    /// The request exceeded the configured deadline
    #[error("request timed out after {0}s")]
    Timeout(u64),
}

impl From<serde_json::Error> for GenAiError {
    fn from(err: serde_json::Error) -> Self {
        GenAiError::Parse(err.to_string())
    }
}
