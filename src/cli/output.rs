//! CLI output handling: event rendering and the final looks summary.

use std::io::{self, Write};

use anyhow::Result;

use crate::stylist::{StylingSnapshot, StylistEvent};

/// Render one session event according to the output mode.
pub fn render_event(event: &StylistEvent, json_mode: bool, quiet_mode: bool) -> Result<()> {
    if json_mode {
        println!("{}", serde_json::to_string(event)?);
        io::stdout().flush()?;
        return Ok(());
    }
    if quiet_mode {
        return Ok(());
    }

    match event {
        StylistEvent::UploadAccepted { .. } => eprintln!("Analyzing your style..."),
        StylistEvent::AnalysisCompleted { analysis } => {
            eprintln!(
                "Identified: {} ({} style)",
                analysis.garment_type, analysis.style
            );
        }
        StylistEvent::OutfitsPlanned { count } => {
            eprintln!("Planned {count} looks, visualizing outfits...");
        }
        StylistEvent::VisualReady { slot } => eprintln!("Look {slot} is ready"),
        StylistEvent::VisualFailed { slot, message } => {
            eprintln!("Look {slot} could not be visualized: {message}");
        }
        StylistEvent::VisualsSettled => eprintln!("Looks ready for review"),
        StylistEvent::EditApplied { slot } => eprintln!("Refined look {slot}"),
        StylistEvent::EditFailed { slot, message } => {
            eprintln!("Refinement of look {slot} failed: {message}");
        }
        StylistEvent::AnalysisFailed { message } | StylistEvent::PlanningFailed { message } => {
            eprintln!("{message}");
        }
        StylistEvent::SessionCleared => {}
    }
    Ok(())
}

/// Print the final summary of the session.
pub fn render_summary(snapshot: &StylingSnapshot, json_mode: bool) -> Result<()> {
    if json_mode {
        println!("{}", serde_json::to_string(snapshot)?);
        return Ok(());
    }

    if let Some(analysis) = &snapshot.analysis {
        println!("{}", analysis.garment_type);
        println!("  style:   {}", analysis.style);
        println!("  palette: {}", analysis.color_palette.join(" "));
        println!("  {}", analysis.description);
        println!();
    }

    for (slot, outfit) in snapshot.outfits.iter().enumerate() {
        let label = outfit
            .category
            .map(|category| category.to_string())
            .unwrap_or_else(|| "Unlabeled".to_string());
        let visual = if outfit.image_url.is_some() {
            "visualized"
        } else {
            "no visual"
        };
        println!("[{slot}] {label} ({visual})");
        println!("  {}", outfit.description);
        if !outfit.pieces.is_empty() {
            println!("  pieces: {}", outfit.pieces.join(", "));
        }
    }

    Ok(())
}
