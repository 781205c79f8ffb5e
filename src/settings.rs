//! Settings loading and environment variable interpolation.
//!
//! Settings live in `~/.atelier/settings.toml` (overridable via the
//! `ATELIER_SETTINGS` environment variable). All fields use
//! `#[serde(default)]` so partial files work; a missing file yields
//! defaults. String values support `$VAR` and `${VAR}` references.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Settings for the styling assistant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Generative Language API key; falls back to `GEMINI_API_KEY`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model used for analysis and planning
    pub text_model: String,

    /// Model used for visual synthesis and editing
    pub image_model: String,

    /// Bounded wait per external call, in seconds
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            text_model: genai_rest::models::GEMINI_3_FLASH.to_string(),
            image_model: genai_rest::models::GEMINI_25_FLASH_IMAGE.to_string(),
            request_timeout_secs: 120,
        }
    }
}

/// Get the path to the settings file.
pub fn settings_path() -> PathBuf {
    if let Ok(path) = std::env::var("ATELIER_SETTINGS") {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".atelier")
        .join("settings.toml")
}

impl Settings {
    /// Load settings from the default location.
    pub async fn load() -> Result<Self> {
        Self::load_from_path(&settings_path()).await
    }

    /// Load settings from a specific path.
    pub async fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Settings file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = tokio::fs::read_to_string(path)
            .await
            .context("Failed to read settings file")?;

        let mut settings: Settings =
            toml::from_str(&contents).context("Failed to deserialize settings")?;

        if let Some(key) = &mut settings.api_key {
            if let Some(resolved) = resolve_env_ref(key) {
                *key = resolved;
            }
        }

        tracing::info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Resolve the API key with environment fallback.
    ///
    /// Priority order:
    /// 1. Settings value (if set and non-empty)
    /// 2. `GEMINI_API_KEY` environment variable
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = &self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var(genai_rest::API_KEY_ENV)
            .ok()
            .filter(|key| !key.is_empty())
    }
}

/// Resolve a `$VAR_NAME` or `${VAR_NAME}` environment reference.
fn resolve_env_ref(value: &str) -> Option<String> {
    let trimmed = value.trim();

    if trimmed.starts_with('$') {
        let var_name = if trimmed.starts_with("${") && trimmed.ends_with('}') {
            &trimmed[2..trimmed.len() - 1]
        } else {
            &trimmed[1..]
        };

        return std::env::var(var_name).ok();
    }

    None
}
