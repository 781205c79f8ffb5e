//! Atelier - core orchestration for an AI styling assistant.
//!
//! A user uploads a photo of a clothing item; an external generative
//! service analyzes it, plans three outfit pairings (Casual, Business,
//! Night Out), and synthesizes a visual for each, with optional free-text
//! refinement per look. This crate owns the session state machine and the
//! typed clients for those four service operations; rendering is left to
//! whichever presentation layer consumes the snapshot and event streams.

pub mod error;
pub mod settings;
pub mod stylist;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::StylistError;
pub use settings::Settings;
pub use stylist::{
    spawn_session, GenAiBackend, ImageData, ItemAnalysis, OutfitCategory, OutfitSuggestion,
    SessionHandle, StylingSnapshot, StylistBackend, StylistEvent,
};
