//! Item analyzer client.
//!
//! Sends the uploaded photo to the text model with a schema-constrained
//! request and decodes the result into an [`ItemAnalysis`]. Any transport,
//! decode, or shape problem is an [`StylistError::Analysis`], which is
//! fatal for the session.

use genai_rest::{Client, Content, GenAiError, GenerateContentRequest, GenerationConfig, Part, Schema};

use super::model::{ImageData, ItemAnalysis};
use crate::error::StylistError;

const ANALYZE_INSTRUCTION: &str = "Analyze this clothing item for a virtual stylist app. \
Identify the type of garment, the primary color palette (as hex codes), the overall style vibe, \
and a detailed description of its patterns and texture. Return the result in a clean JSON format.";

/// Client for the structured-analysis operation.
#[derive(Debug, Clone)]
pub struct ItemAnalyzer {
    client: Client,
    model: String,
}

impl ItemAnalyzer {
    pub fn new(client: Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Analyze an uploaded item photo.
    pub async fn analyze(&self, image: &ImageData) -> Result<ItemAnalysis, StylistError> {
        let request = self.build_request(image);
        let response = self
            .client
            .generate_content(&self.model, &request)
            .await
            .map_err(StylistError::Analysis)?;

        decode_analysis(&response.text()).map_err(StylistError::Analysis)
    }

    fn build_request(&self, image: &ImageData) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(vec![
                Part::inline_data(&image.mime_type, &image.data),
                Part::text(ANALYZE_INSTRUCTION),
            ])],
            generation_config: Some(GenerationConfig::json(analysis_schema())),
        }
    }
}

/// Response shape requested from the service: the four analysis fields,
/// all required.
fn analysis_schema() -> Schema {
    Schema::object(vec![
        ("type", Schema::string()),
        ("colorPalette", Schema::array(Schema::string())),
        ("style", Schema::string()),
        ("description", Schema::string()),
    ])
}

fn decode_analysis(raw: &str) -> Result<ItemAnalysis, GenAiError> {
    let analysis: ItemAnalysis = serde_json::from_str(raw)?;
    if analysis.description.trim().is_empty() {
        return Err(GenAiError::Parse("analysis description is empty".to_string()));
    }
    if analysis.color_palette.is_empty() {
        return Err(GenAiError::Parse("analysis color palette is empty".to_string()));
    }
    Ok(analysis)
}
