//! Visual editor client.
//!
//! Sends an existing look image together with a free-text instruction in
//! one call and returns the replacement image. The caller only applies the
//! result on success, so a failed edit never corrupts the slot's prior
//! visual.

use genai_rest::{Client, Content, GenAiError, GenerateContentRequest, Part};

use super::model::ImageData;
use crate::error::StylistError;

/// Client for the image-edit operation.
#[derive(Debug, Clone)]
pub struct VisualEditor {
    client: Client,
    model: String,
}

impl VisualEditor {
    pub fn new(client: Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Apply a free-text edit to an existing look image (a data URL).
    pub async fn edit(&self, image_url: &str, instruction: &str) -> Result<ImageData, StylistError> {
        let image = ImageData::from_data_url(image_url).ok_or_else(|| {
            StylistError::Edit(GenAiError::Parse(
                "existing image is not a base64 data URL".to_string(),
            ))
        })?;

        let request = build_request(&image, instruction);
        let response = self
            .client
            .generate_content(&self.model, &request)
            .await
            .map_err(StylistError::Edit)?;

        let blob = response
            .first_inline_image()
            .ok_or(StylistError::Edit(GenAiError::NoImagePayload))?;

        let mime_type = if blob.mime_type.is_empty() {
            image.mime_type.clone()
        } else {
            blob.mime_type.clone()
        };
        Ok(ImageData::new(mime_type, blob.data.clone()))
    }
}

fn build_request(image: &ImageData, instruction: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::user(vec![
            Part::inline_data(&image.mime_type, &image.data),
            Part::text(instruction),
        ])],
        generation_config: None,
    }
}
