//! Outfit planner client.
//!
//! Given an item analysis, asks the text model for exactly three outfit
//! suggestions tagged Casual / Business / Night Out. The response is
//! schema-constrained, but the category labels are still coerced
//! defensively: an unrecognized label becomes an unlabeled slot rather
//! than an error, while a wrong suggestion count is fatal.

use genai_rest::{Client, Content, GenAiError, GenerateContentRequest, GenerationConfig, Part, Schema};
use serde::Deserialize;

use super::model::{ItemAnalysis, OutfitCategory, OutfitSuggestion, OUTFIT_SLOTS};
use crate::error::StylistError;

/// Client for the structured-planning operation.
#[derive(Debug, Clone)]
pub struct OutfitPlanner {
    client: Client,
    model: String,
}

/// Wire shape of one planned outfit, before category coercion.
#[derive(Debug, Deserialize)]
struct PlannedOutfit {
    #[serde(default)]
    category: String,
    description: String,
    #[serde(default)]
    pieces: Vec<String>,
}

impl OutfitPlanner {
    pub fn new(client: Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Plan three outfits around the analyzed item.
    pub async fn plan(&self, analysis: &ItemAnalysis) -> Result<Vec<OutfitSuggestion>, StylistError> {
        let request = self.build_request(analysis);
        let response = self
            .client
            .generate_content(&self.model, &request)
            .await
            .map_err(StylistError::Planning)?;

        decode_plan(&response.text()).map_err(StylistError::Planning)
    }

    fn build_request(&self, analysis: &ItemAnalysis) -> GenerateContentRequest {
        let prompt = format!(
            "Based on this item: {} ({} style, colors: {}), \
             suggest 3 distinct outfit combinations for 'Casual', 'Business', and 'Night Out' occasions. \
             For each, provide a brief styling logic and a list of specific pieces to pair it with.",
            analysis.description,
            analysis.style,
            analysis.color_palette.join(", ")
        );

        GenerateContentRequest {
            contents: vec![Content::user(vec![Part::text(prompt)])],
            generation_config: Some(GenerationConfig::json(plan_schema())),
        }
    }
}

fn plan_schema() -> Schema {
    Schema::array(Schema::object(vec![
        ("category", Schema::string()),
        ("description", Schema::string()),
        ("pieces", Schema::array(Schema::string())),
    ]))
}

fn decode_plan(raw: &str) -> Result<Vec<OutfitSuggestion>, GenAiError> {
    let planned: Vec<PlannedOutfit> = serde_json::from_str(raw)?;
    if planned.len() != OUTFIT_SLOTS {
        return Err(GenAiError::Parse(format!(
            "expected {} outfit suggestions, got {}",
            OUTFIT_SLOTS,
            planned.len()
        )));
    }

    Ok(planned
        .into_iter()
        .map(|outfit| OutfitSuggestion {
            category: OutfitCategory::parse(&outfit.category),
            description: outfit.description,
            pieces: outfit.pieces,
            image_url: None,
        })
        .collect())
}
