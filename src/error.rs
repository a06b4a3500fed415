use std::io;
use thiserror::Error;

/// Errors raised while loading rig assets.
///
/// Per-frame playback never fails; only parsing and resolving descriptions do.
#[derive(Error, Debug)]
pub enum RigError {
    /// I/O error while reading an asset file
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The resolver has no skeleton description under this name
    #[error("Skeleton description not found: {0}")]
    SkeletonNotFound(String),

    /// No built-in clip under this name
    #[error("Clip not found: {0}")]
    ClipNotFound(String),

    /// Clip data that cannot be played back
    #[error("Invalid clip: {0}")]
    InvalidClip(String),

    /// Scene configuration that cannot be applied
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type using RigError
pub type Result<T> = std::result::Result<T, RigError>;
