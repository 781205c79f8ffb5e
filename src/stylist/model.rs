//! Data model for a styling session.
//!
//! Everything here is a plain value type: the session dispatcher owns one
//! [`StylingSnapshot`] and publishes whole-snapshot replacements, so all of
//! these derive `Clone` and serialize with the wire names the presentation
//! layer expects.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of outfit slots in a planned session.
pub const OUTFIT_SLOTS: usize = 3;

/// An image payload carried as base64 with a MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageData {
    pub mime_type: String,
    /// Base64-encoded bytes
    pub data: String,
}

impl ImageData {
    /// Create from a MIME type and already-encoded base64 payload.
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Create from raw bytes, encoding them as base64.
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: BASE64.encode(bytes),
        }
    }

    /// Decode the base64 payload back into bytes.
    pub fn decode_bytes(&self) -> Option<Vec<u8>> {
        BASE64.decode(&self.data).ok()
    }

    /// Render as a self-contained `data:` URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Parse a `data:<mime>;base64,<payload>` URL.
    pub fn from_data_url(url: &str) -> Option<Self> {
        let rest = url.strip_prefix("data:")?;
        let (header, data) = rest.split_once(',')?;
        let mime_type = header.strip_suffix(";base64")?;
        if mime_type.is_empty() || data.is_empty() {
            return None;
        }
        Some(Self::new(mime_type, data))
    }
}

/// Structured description of the uploaded item, produced once per session
/// by the analyzer. Immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemAnalysis {
    /// Garment type label ("type" on the wire)
    #[serde(rename = "type")]
    pub garment_type: String,
    /// Primary colors as hex-like strings, ordered
    pub color_palette: Vec<String>,
    /// Overall style vibe
    pub style: String,
    /// Narrative description of pattern and texture
    pub description: String,
}

/// The three fixed outfit occasions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutfitCategory {
    Casual,
    Business,
    #[serde(rename = "Night Out")]
    NightOut,
}

impl OutfitCategory {
    /// All categories in slot order.
    pub const ALL: [OutfitCategory; OUTFIT_SLOTS] = [
        OutfitCategory::Casual,
        OutfitCategory::Business,
        OutfitCategory::NightOut,
    ];

    /// Lenient parse of a service-produced label. The planner model is
    /// asked for exact labels but case, spacing, and punctuation drift in
    /// practice; anything unrecognized yields `None` (an unlabeled slot).
    pub fn parse(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "casual" => Some(OutfitCategory::Casual),
            "business" => Some(OutfitCategory::Business),
            "nightout" => Some(OutfitCategory::NightOut),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutfitCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            OutfitCategory::Casual => "Casual",
            OutfitCategory::Business => "Business",
            OutfitCategory::NightOut => "Night Out",
        };
        f.write_str(label)
    }
}

/// One planned look. Identity is positional (slot index); only `image_url`
/// mutates after creation, and only through the session dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitSuggestion {
    /// Occasion label; `None` when the service returned something outside
    /// the fixed set
    pub category: Option<OutfitCategory>,
    /// Styling rationale
    pub description: String,
    /// Complementary pieces to pair with the item
    pub pieces: Vec<String>,
    /// Self-contained data URL of the synthesized visual; absent until
    /// synthesis completes for this slot
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// The single in-memory session snapshot.
///
/// Replaced wholesale on every mutation; readers never observe a partially
/// applied update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylingSnapshot {
    /// The uploaded item photo, present only while a session is active
    pub source_image: Option<ImageData>,
    pub analysis: Option<ItemAnalysis>,
    /// Empty until planning completes, then exactly three slots
    pub outfits: Vec<OutfitSuggestion>,
    pub analyzing: bool,
    pub synthesizing: bool,
    /// Session-level error message; set only by fatal failures
    pub error: Option<String>,
    /// When the active session started
    pub started_at: Option<DateTime<Utc>>,
}

impl StylingSnapshot {
    /// Whether every planned slot has a visual.
    pub fn is_ready(&self) -> bool {
        !self.outfits.is_empty() && self.outfits.iter().all(|outfit| outfit.image_url.is_some())
    }

    /// Summary line for the active session, mirroring the app's status
    /// strip. `None` when no item has been uploaded.
    pub fn status_message(&self) -> Option<&'static str> {
        self.source_image.as_ref()?;
        if self.analyzing {
            Some("Analyzing your style...")
        } else if self.outfits.iter().any(|outfit| outfit.image_url.is_none()) {
            Some("Visualizing outfits...")
        } else {
            Some("Looks ready for review")
        }
    }
}
