//! Styling assistant core: data model, the four service clients, and the
//! session state machine that sequences them.

pub mod analyzer;
pub mod backend;
pub mod editor;
pub mod events;
pub mod model;
pub mod planner;
pub mod session;
pub mod synthesizer;

pub use backend::{GenAiBackend, StylistBackend};
pub use events::StylistEvent;
pub use model::{
    ImageData, ItemAnalysis, OutfitCategory, OutfitSuggestion, StylingSnapshot, OUTFIT_SLOTS,
};
pub use session::{spawn_session, SessionHandle};
