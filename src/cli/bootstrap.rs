//! CLI bootstrap: environment, logging, settings, and session wiring.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use super::args::Args;
use crate::settings::Settings;
use crate::stylist::{spawn_session, GenAiBackend, SessionHandle, StylistBackend, StylistEvent};

/// Everything a CLI run needs: the live session plus its event stream.
pub struct CliContext {
    pub session: SessionHandle,
    pub event_rx: mpsc::UnboundedReceiver<StylistEvent>,
}

/// Initialize the full stack: dotenv, tracing, settings, service client,
/// backend, session.
pub async fn initialize(args: &Args) -> Result<CliContext> {
    // Load .env before anything reads the environment
    dotenvy::dotenv().ok();

    init_tracing(args.verbose);

    let settings = Settings::load().await?;

    let api_key = args
        .api_key
        .clone()
        .or_else(|| settings.resolve_api_key())
        .context(
            "No API key configured. Set GEMINI_API_KEY, pass --api-key, \
             or add api_key to ~/.atelier/settings.toml",
        )?;

    let client = genai_rest::Client::with_timeout(api_key, settings.request_timeout_secs)?;

    let text_model = args
        .text_model
        .clone()
        .unwrap_or_else(|| settings.text_model.clone());
    let image_model = args
        .image_model
        .clone()
        .unwrap_or_else(|| settings.image_model.clone());

    let backend = GenAiBackend::with_models(client, text_model, image_model);

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let session = spawn_session(Arc::new(backend) as Arc<dyn StylistBackend>, event_tx);

    Ok(CliContext { session, event_rx })
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "atelier=debug" } else { "atelier=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    // A second init (e.g. in tests) is fine to ignore
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
