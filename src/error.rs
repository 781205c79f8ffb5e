use genai_rest::GenAiError;
use thiserror::Error;

/// Failure taxonomy for a styling session.
///
/// Analysis and planning failures are fatal: nothing downstream can run
/// without them, so the session surfaces a user-facing error and waits for
/// a re-upload. Synthesis and edit failures are scoped to a single outfit
/// slot and never touch session-level state.
#[derive(Debug, Error)]
pub enum StylistError {
    #[error("item analysis failed: {0}")]
    Analysis(#[source] GenAiError),

    #[error("outfit planning failed: {0}")]
    Planning(#[source] GenAiError),

    #[error("visual synthesis failed: {0}")]
    Synthesis(#[source] GenAiError),

    #[error("image edit failed: {0}")]
    Edit(#[source] GenAiError),
}

impl StylistError {
    /// Whether this failure invalidates the whole session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StylistError::Analysis(_) | StylistError::Planning(_))
    }

    /// Human-readable message surfaced at session level for fatal kinds.
    pub fn user_message(&self) -> &'static str {
        match self {
            StylistError::Analysis(_) | StylistError::Planning(_) => {
                "Styling engine failed to initialize. Please try again."
            }
            StylistError::Synthesis(_) => "A look could not be visualized.",
            StylistError::Edit(_) => "The refinement could not be applied.",
        }
    }
}

pub type Result<T> = std::result::Result<T, StylistError>;
