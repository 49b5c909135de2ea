// Error handling for the player core

use thiserror::Error;

/// Player error types
///
/// None of these are fatal to the host: the controller degrades to an
/// unresponsive or unlabeled control surface instead of panicking.
#[derive(Debug, Clone, Error)]
pub enum PlayerError {
    /// Host configuration could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Language resource could not be fetched over the network
    #[error("Network error: {0}")]
    Network(String),

    /// Local file access failed
    #[error("IO error: {0}")]
    Io(String),

    /// A resource (language pack, config JSON) was malformed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Operation not valid in the current lifecycle state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Bad input crossing the C boundary
    #[error("FFI error: {0}")]
    Ffi(String),
}

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, PlayerError>;

impl From<std::io::Error> for PlayerError {
    fn from(err: std::io::Error) -> Self {
        PlayerError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PlayerError {
    fn from(err: serde_json::Error) -> Self {
        PlayerError::Parse(err.to_string())
    }
}
