//! One-shot CLI execution: upload, wait for looks, refine, write output.

use std::path::Path;

use anyhow::{Context, Result};

use super::args::Args;
use super::bootstrap::CliContext;
use super::output;
use crate::stylist::{ImageData, StylistEvent};

/// Run a full styling session for one image and exit.
pub async fn run_once(ctx: &mut CliContext, args: &Args) -> Result<()> {
    let image_path = args.resolve_image()?;
    let refinements = args.parse_refinements()?;

    // Suppress progress chatter when piped, same as quiet mode
    let quiet = args.quiet || (!args.json && !atty::is(atty::Stream::Stderr));

    let image = load_image(&image_path)?;
    ctx.session.upload(image);

    // Consume events until the session settles or fails
    while let Some(event) = ctx.event_rx.recv().await {
        output::render_event(&event, args.json, quiet)?;
        match event {
            StylistEvent::AnalysisFailed { message }
            | StylistEvent::PlanningFailed { message } => {
                anyhow::bail!("{message}");
            }
            StylistEvent::VisualsSettled => break,
            _ => {}
        }
    }

    // Apply refinements one at a time, waiting for each to resolve
    for (slot, instruction) in refinements {
        ctx.session.request_edit(slot, instruction);
        while let Some(event) = ctx.event_rx.recv().await {
            output::render_event(&event, args.json, quiet)?;
            match event {
                StylistEvent::EditApplied { .. } | StylistEvent::EditFailed { .. } => break,
                _ => {}
            }
        }
    }

    let snapshot = ctx.session.snapshot();
    output::render_summary(&snapshot, args.json)?;

    if let Some(out_dir) = &args.out {
        write_looks(out_dir, &snapshot)?;
    }

    Ok(())
}

/// Read the photo from disk and encode it for upload.
fn load_image(path: &Path) -> Result<ImageData> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(ImageData::from_bytes(mime_for_path(path), &bytes))
}

/// Guess a MIME type from the file extension.
fn mime_for_path(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/png",
    }
}

/// Write each visualized look into `out_dir`.
fn write_looks(out_dir: &Path, snapshot: &crate::stylist::StylingSnapshot) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    for (slot, outfit) in snapshot.outfits.iter().enumerate() {
        let Some(image_url) = &outfit.image_url else {
            continue;
        };
        let Some(image) = ImageData::from_data_url(image_url) else {
            tracing::warn!(slot, "slot visual is not a data URL, skipping");
            continue;
        };
        let Some(bytes) = image.decode_bytes() else {
            tracing::warn!(slot, "slot visual payload is not valid base64, skipping");
            continue;
        };

        let label = outfit
            .category
            .map(|category| category.to_string().to_ascii_lowercase().replace(' ', "-"))
            .unwrap_or_else(|| "look".to_string());
        let extension = match image.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            _ => "png",
        };
        let path = out_dir.join(format!("look-{slot}-{label}.{extension}"));
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote look image");
    }

    Ok(())
}
