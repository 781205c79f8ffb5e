//! Client for the Generative Language API.

use std::time::Duration;

use crate::error::GenAiError;
use crate::types::{ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse};

/// Endpoint URL template
const GENAI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/{model}:{operation}";

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Default bounded wait per call. Image synthesis is the slow path.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Client for the Generative Language API.
///
/// Cheap to clone; the underlying `reqwest::Client` is shared. One client
/// is constructed at process start and handed to every component that
/// talks to the service.
#[derive(Clone)]
pub struct Client {
    /// HTTP client for making requests
    http_client: reqwest::Client,
    /// API key sent with every request
    api_key: String,
    /// Per-request deadline, for error reporting
    timeout_secs: u64,
}

impl Client {
    /// Create a new client with the default per-request timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self, GenAiError> {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a new client with an explicit per-request timeout.
    ///
    /// Every call made through this client is bounded by `timeout_secs`;
    /// expiry surfaces as [`GenAiError::Timeout`].
    pub fn with_timeout(api_key: impl Into<String>, timeout_secs: u64) -> Result<Self, GenAiError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GenAiError::MissingApiKey);
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(GenAiError::Http)?;

        Ok(Self {
            http_client,
            api_key,
            timeout_secs,
        })
    }

    /// Create a new client from the `GEMINI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, GenAiError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| GenAiError::MissingApiKey)?;
        Self::new(api_key)
    }

    /// Build the endpoint URL for a given model and operation.
    pub(crate) fn endpoint_url(&self, model: &str, operation: &str) -> String {
        GENAI_ENDPOINT
            .replace("{model}", model)
            .replace("{operation}", operation)
    }

    /// Issue a single `generateContent` call.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenAiError> {
        let url = self.endpoint_url(model, "generateContent");
        tracing::debug!(model, "sending generateContent request");

        let response = self
            .http_client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GenAiError::Timeout(self.timeout_secs)
                } else {
                    GenAiError::Http(e)
                }
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or(body);
            return Err(GenAiError::Api { status, message });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                GenAiError::Timeout(self.timeout_secs)
            } else {
                GenAiError::Http(e)
            }
        })?;

        let parsed: GenerateContentResponse = serde_json::from_str(&body)?;
        Ok(parsed)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}
