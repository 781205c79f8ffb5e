//! Visual synthesizer client.
//!
//! Builds a flat-lay photography prompt from the item analysis and one
//! outfit, invokes the image model, and returns the first inline image
//! payload. Failures here are non-fatal: the affected slot simply stays
//! without a visual.

use genai_rest::{Client, Content, GenAiError, GenerateContentRequest, GenerationConfig, Part};

use super::model::{ImageData, ItemAnalysis, OutfitSuggestion};
use crate::error::StylistError;

/// Aspect ratio for all synthesized looks.
const ASPECT_RATIO: &str = "1:1";

/// Client for the image-synthesis operation.
#[derive(Debug, Clone)]
pub struct VisualSynthesizer {
    client: Client,
    model: String,
}

impl VisualSynthesizer {
    pub fn new(client: Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Synthesize a flat-lay visual for one outfit slot.
    pub async fn synthesize(
        &self,
        analysis: &ItemAnalysis,
        outfit: &OutfitSuggestion,
    ) -> Result<ImageData, StylistError> {
        let request = self.build_request(analysis, outfit);
        let response = self
            .client
            .generate_content(&self.model, &request)
            .await
            .map_err(StylistError::Synthesis)?;

        let blob = response
            .first_inline_image()
            .ok_or(StylistError::Synthesis(GenAiError::NoImagePayload))?;

        Ok(ImageData::new(mime_or_png(&blob.mime_type), blob.data.clone()))
    }

    fn build_request(
        &self,
        analysis: &ItemAnalysis,
        outfit: &OutfitSuggestion,
    ) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text(build_prompt(analysis, outfit))])],
            generation_config: Some(GenerationConfig::image(ASPECT_RATIO)),
        }
    }
}

fn build_prompt(analysis: &ItemAnalysis, outfit: &OutfitSuggestion) -> String {
    let occasion = outfit
        .category
        .map(|category| category.to_string())
        .unwrap_or_else(|| "versatile".to_string());

    format!(
        "A high-end, professional fashion photography flat-lay of a {} outfit. \
         The central piece is the following item: {}. \
         Style this item with: {}. \
         The composition should be a clean, minimalist flat-lay on a neutral off-white background \
         with soft natural lighting and elegant shadows. \
         Professional editorial quality, 4k, vogue style.",
        occasion,
        analysis.description,
        outfit.pieces.join(", ")
    )
}

fn mime_or_png(mime_type: &str) -> String {
    if mime_type.is_empty() {
        "image/png".to_string()
    } else {
        mime_type.to_string()
    }
}
