use thiserror::Error;

use parley_shared::error::ValidationError;
use parley_shared::types::MessageId;

/// Reasons a local command is refused before anything is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Sends are refused until the transport has told us who we are.
    #[error("Local participant not identified yet")]
    NotIdentified,

    /// Edit and delete only apply to our own messages that still exist.
    #[error("Message {0} is unknown or not ours")]
    NotOwnMessage(MessageId),

    #[error("Invalid message: {0}")]
    Invalid(#[from] ValidationError),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;
