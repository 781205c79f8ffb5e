use serde::{Deserialize, Serialize};

use super::model::ItemAnalysis;

/// Session events for the presentation layer.
///
/// The dispatcher emits these over an unbounded channel supplied at spawn;
/// slow or absent consumers never block state transitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StylistEvent {
    /// A new session started from an upload
    UploadAccepted { session_id: String },

    /// Item analysis finished
    AnalysisCompleted { analysis: ItemAnalysis },

    /// Item analysis failed (fatal)
    AnalysisFailed { message: String },

    /// Outfit planning finished; three slots now exist
    OutfitsPlanned { count: usize },

    /// Outfit planning failed (fatal)
    PlanningFailed { message: String },

    /// A slot's visual was synthesized
    VisualReady { slot: usize },

    /// A slot's synthesis failed; the slot stays without an image
    VisualFailed { slot: usize, message: String },

    /// All three synthesis calls have resolved, success or failure
    VisualsSettled,

    /// An edit replaced a slot's visual
    EditApplied { slot: usize },

    /// An edit failed; the slot's prior visual is preserved
    EditFailed { slot: usize, message: String },

    /// The session was reset to empty
    SessionCleared,
}
