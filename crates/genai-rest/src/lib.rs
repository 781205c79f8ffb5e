//! REST client for the Google Generative Language API (Gemini).
//!
//! This crate covers the small slice of the API that Atelier needs: the
//! single-shot `generateContent` call, with schema-constrained JSON output
//! for structured requests and inline image payloads for synthesis and
//! editing. No streaming.
//!
//! # Example
//!
//! ```rust,no_run
//! use genai_rest::{Client, Content, GenerateContentRequest, Part};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads GEMINI_API_KEY from the environment
//!     let client = Client::from_env()?;
//!
//!     let request = GenerateContentRequest {
//!         contents: vec![Content::user(vec![Part::text("Describe a silk scarf.")])],
//!         generation_config: None,
//!     };
//!
//!     let response = client
//!         .generate_content(genai_rest::models::GEMINI_3_FLASH, &request)
//!         .await?;
//!     println!("{}", response.text());
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::{Client, API_KEY_ENV};
pub use error::GenAiError;
pub use types::*;

/// Model identifiers used by the styling app
pub mod models {
    /// Text model with structured-output support, used for analysis and planning
    pub const GEMINI_3_FLASH: &str = "gemini-3-flash-preview";
    /// Image generation and editing model
    pub const GEMINI_25_FLASH_IMAGE: &str = "gemini-2.5-flash-image";
}
