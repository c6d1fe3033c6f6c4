//! Error types for motiva_tween

use thiserror::Error;

/// Errors surfaced by the orchestration layer
///
/// Boundary operations (preset playback, bulk control, sequence
/// spawning) never return these for expected runtime conditions — they
/// log and degrade instead. The `try_*` variants expose the cause for
/// callers that want it.
#[derive(Error, Debug)]
pub enum TweenError {
    /// The animation target is dead or cannot be animated
    #[error("target is not valid for animation")]
    InvalidTarget,

    /// No preset registered under this name
    #[error("unknown preset `{name}` (known presets: {})", .known.join(", "))]
    NotFound { name: String, known: Vec<String> },

    /// The preset's applicability predicate rejected the target
    #[error("preset `{name}` is not applicable to this target")]
    NotApplicable { name: String },

    /// The preset factory panicked while building the animation
    #[error("preset `{name}` factory failed: {reason}")]
    CreationFailed { name: String, reason: String },

    /// A construction API was misused (e.g. mismatched stagger
    /// collection lengths)
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// An awaited completion timed out
    #[error("await timed out")]
    Timeout,

    /// An awaited completion was cancelled
    #[error("await cancelled")]
    Cancelled,
}

/// Result type for motiva_tween operations
pub type Result<T> = std::result::Result<T, TweenError>;
