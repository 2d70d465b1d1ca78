use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParleyError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Message is empty")]
    EmptyMessage,

    #[error("Message too long: {len} characters (max {max})")]
    MessageTooLong { len: usize, max: usize },

    #[error("Mention {index} overlaps or precedes the previous one")]
    MentionsOutOfOrder { index: usize },

    #[error("Mention {index} is empty")]
    EmptyMention { index: usize },

    #[error("Mention {index} ends past the end of the text ({end} > {len})")]
    MentionOutOfBounds { index: usize, end: usize, len: usize },

    #[error("File too large: {size} bytes (max {max})")]
    FileTooLarge { size: u64, max: u64 },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ParleyError>;
