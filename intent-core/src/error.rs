//! Error types for the voice intent engine

use thiserror::Error;

/// Result type alias using the engine's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading configuration or talking to dispatch collaborators.
///
/// Classification never produces one of these; unmatched input resolves to `Intent::Unknown`.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to launch: {0}")]
    Launch(String),

    #[error("Volume control failed: {0}")]
    Volume(String),

    #[error("Timer scheduling failed: {0}")]
    Timer(String),
}
