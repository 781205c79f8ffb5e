//! Backend abstraction over the four external-service operations.
//!
//! The session dispatcher talks to a [`StylistBackend`] rather than to the
//! concrete clients, which keeps the state machine testable without a
//! network. [`GenAiBackend`] is the production implementation: one shared
//! service client, constructed at process start and passed in explicitly.

use async_trait::async_trait;
use genai_rest::{models, Client};

use super::analyzer::ItemAnalyzer;
use super::editor::VisualEditor;
use super::model::{ImageData, ItemAnalysis, OutfitSuggestion};
use super::planner::OutfitPlanner;
use super::synthesizer::VisualSynthesizer;
use crate::error::StylistError;

/// The four logical operations of the external generative service.
#[async_trait]
pub trait StylistBackend: Send + Sync {
    async fn analyze_item(&self, image: &ImageData) -> Result<ItemAnalysis, StylistError>;

    async fn plan_outfits(
        &self,
        analysis: &ItemAnalysis,
    ) -> Result<Vec<OutfitSuggestion>, StylistError>;

    async fn synthesize_visual(
        &self,
        analysis: &ItemAnalysis,
        outfit: &OutfitSuggestion,
    ) -> Result<ImageData, StylistError>;

    async fn edit_visual(&self, image_url: &str, instruction: &str)
        -> Result<ImageData, StylistError>;
}

/// Production backend wrapping the four Generative Language API clients.
#[derive(Debug, Clone)]
pub struct GenAiBackend {
    analyzer: ItemAnalyzer,
    planner: OutfitPlanner,
    synthesizer: VisualSynthesizer,
    editor: VisualEditor,
}

impl GenAiBackend {
    /// Create a backend with the default text and image models.
    pub fn new(client: Client) -> Self {
        Self::with_models(client, models::GEMINI_3_FLASH, models::GEMINI_25_FLASH_IMAGE)
    }

    /// Create a backend with explicit model identifiers.
    pub fn with_models(
        client: Client,
        text_model: impl Into<String>,
        image_model: impl Into<String>,
    ) -> Self {
        let text_model = text_model.into();
        let image_model = image_model.into();
        Self {
            analyzer: ItemAnalyzer::new(client.clone(), text_model.clone()),
            planner: OutfitPlanner::new(client.clone(), text_model),
            synthesizer: VisualSynthesizer::new(client.clone(), image_model.clone()),
            editor: VisualEditor::new(client, image_model),
        }
    }
}

#[async_trait]
impl StylistBackend for GenAiBackend {
    async fn analyze_item(&self, image: &ImageData) -> Result<ItemAnalysis, StylistError> {
        self.analyzer.analyze(image).await
    }

    async fn plan_outfits(
        &self,
        analysis: &ItemAnalysis,
    ) -> Result<Vec<OutfitSuggestion>, StylistError> {
        self.planner.plan(analysis).await
    }

    async fn synthesize_visual(
        &self,
        analysis: &ItemAnalysis,
        outfit: &OutfitSuggestion,
    ) -> Result<ImageData, StylistError> {
        self.synthesizer.synthesize(analysis, outfit).await
    }

    async fn edit_visual(
        &self,
        image_url: &str,
        instruction: &str,
    ) -> Result<ImageData, StylistError> {
        self.editor.edit(image_url, instruction).await
    }
}
