use thiserror::Error;

use parley_engine::EngineError;
use parley_shared::error::ValidationError;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Engine rejected command: {0}")]
    Engine(#[from] EngineError),

    #[error("Invalid file: {0}")]
    Validation(#[from] ValidationError),

    #[error("Transport not connected")]
    NotConnected,

    #[error("Transport command channel closed")]
    ChannelClosed,

    #[error("Transport dropped the send acknowledgment")]
    AckDropped,

    #[error("Client state lock poisoned")]
    LockPoisoned,

    #[error("Event sink error: {0}")]
    Sink(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;
