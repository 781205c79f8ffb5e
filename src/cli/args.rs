//! CLI argument parsing using clap.

use std::path::PathBuf;

use clap::Parser;

/// Atelier CLI - Headless interface for the AI styling assistant
#[derive(Parser, Debug, Clone)]
#[command(name = "atelier-cli")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Photo of the clothing item to style
    pub image: PathBuf,

    /// Refine a finished look, formatted as "<slot>:<instruction>"
    /// (repeatable; applied after all visuals settle)
    #[arg(short = 'r', long = "refine")]
    pub refine: Vec<String>,

    /// Directory to write the generated look images into
    #[arg(short = 'o', long)]
    pub out: Option<PathBuf>,

    /// API key (overrides settings and env vars)
    #[arg(long, env = "ATELIER_API_KEY")]
    pub api_key: Option<String>,

    /// Override the analysis/planning model from settings
    #[arg(long)]
    pub text_model: Option<String>,

    /// Override the synthesis/editing model from settings
    #[arg(long)]
    pub image_model: Option<String>,

    /// Output events as JSON lines (for scripting/parsing)
    #[arg(long)]
    pub json: bool,

    /// Only output the final looks summary (suppress progress)
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Show verbose output (debug information)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

impl Args {
    /// Resolve the image path, ensuring it exists and is a file.
    pub fn resolve_image(&self) -> anyhow::Result<PathBuf> {
        let canonical = self.image.canonicalize().map_err(|e| {
            anyhow::anyhow!(
                "Image '{}' does not exist or is not accessible: {}",
                self.image.display(),
                e
            )
        })?;

        if !canonical.is_file() {
            anyhow::bail!("Image '{}' is not a file", canonical.display());
        }

        Ok(canonical)
    }

    /// Parse `--refine` values into `(slot, instruction)` pairs.
    pub fn parse_refinements(&self) -> anyhow::Result<Vec<(usize, String)>> {
        self.refine
            .iter()
            .map(|raw| {
                let (slot, instruction) = raw.split_once(':').ok_or_else(|| {
                    anyhow::anyhow!("Refinement '{}' must look like \"<slot>:<instruction>\"", raw)
                })?;
                let slot: usize = slot
                    .trim()
                    .parse()
                    .map_err(|_| anyhow::anyhow!("Refinement slot '{}' is not a number", slot))?;
                let instruction = instruction.trim();
                if instruction.is_empty() {
                    anyhow::bail!("Refinement '{}' has an empty instruction", raw);
                }
                Ok((slot, instruction.to_string()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_default_values() {
        let args = Args::parse_from(["atelier-cli", "scarf.png"]);
        assert_eq!(args.image, PathBuf::from("scarf.png"));
        assert!(args.refine.is_empty());
        assert!(!args.json);
        assert!(!args.quiet);
        assert!(!args.verbose);
    }

    #[test]
    fn test_args_refine_repeats() {
        let args = Args::parse_from([
            "atelier-cli",
            "scarf.png",
            "-r",
            "0:add a retro film filter",
            "--refine",
            "2: make it more edgy",
        ]);
        let refinements = args.parse_refinements().unwrap();
        assert_eq!(refinements.len(), 2);
        assert_eq!(refinements[0], (0, "add a retro film filter".to_string()));
        assert_eq!(refinements[1], (2, "make it more edgy".to_string()));
    }

    #[test]
    fn test_malformed_refinements_are_rejected() {
        let args = Args::parse_from(["atelier-cli", "scarf.png", "-r", "no-colon"]);
        assert!(args.parse_refinements().is_err());

        let args = Args::parse_from(["atelier-cli", "scarf.png", "-r", "one:"]);
        assert!(args.parse_refinements().is_err());

        let args = Args::parse_from(["atelier-cli", "scarf.png", "-r", "x:do it"]);
        assert!(args.parse_refinements().is_err());
    }

    #[test]
    fn test_model_overrides() {
        let args = Args::parse_from([
            "atelier-cli",
            "scarf.png",
            "--text-model",
            "gemini-3-flash-preview",
            "--image-model",
            "gemini-2.5-flash-image",
        ]);
        assert_eq!(args.text_model.as_deref(), Some("gemini-3-flash-preview"));
        assert_eq!(args.image_model.as_deref(), Some("gemini-2.5-flash-image"));
    }
}
