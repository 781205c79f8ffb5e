//! Atelier CLI - Headless interface for the AI styling assistant
//!
//! This binary runs one full styling session from the command line:
//! upload a photo, let the stylist analyze it, plan three looks, and
//! visualize them, then optionally refine individual looks.
//!
//! # Usage
//!
//! ```bash
//! # Style a photo and print the three looks
//! atelier-cli scarf.png
//!
//! # Write the generated look images into a directory
//! atelier-cli scarf.png -o looks/
//!
//! # Refine look 1 after visuals settle
//! atelier-cli scarf.png -r "1:add a retro film filter"
//!
//! # JSON-lines events for scripting
//! atelier-cli scarf.png --json | jq .
//! ```

use anyhow::Result;
use clap::Parser;

use atelier_lib::cli::{initialize, run_once, Args};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut ctx = initialize(&args).await?;

    run_once(&mut ctx, &args).await
}
