use crate::constants::MAX_MESSAGE_LENGTH;
use crate::error::ValidationError;
use crate::types::Mention;

/// Check an outgoing message body. A message needs text or at least one file.
pub fn validate_message_content(text: &str, file_count: usize) -> Result<(), ValidationError> {
    if text.trim().is_empty() && file_count == 0 {
        return Err(ValidationError::EmptyMessage);
    }
    let len = text.chars().count();
    if len > MAX_MESSAGE_LENGTH {
        return Err(ValidationError::MessageTooLong {
            len,
            max: MAX_MESSAGE_LENGTH,
        });
    }
    Ok(())
}

/// Check that locally composed mentions are sorted, non-overlapping,
/// non-empty and inside `text`.
///
/// The mention renderer relies on these properties without checking them,
/// so anything we produce ourselves goes through here first.
pub fn validate_mentions(text: &str, mentions: &[Mention]) -> Result<(), ValidationError> {
    let len = text.chars().count();
    let mut previous_end = 0;
    for (index, mention) in mentions.iter().enumerate() {
        if mention.length == 0 {
            return Err(ValidationError::EmptyMention { index });
        }
        if mention.offset < previous_end {
            return Err(ValidationError::MentionsOutOfOrder { index });
        }
        if mention.end() > len {
            return Err(ValidationError::MentionOutOfBounds {
                index,
                end: mention.end(),
                len,
            });
        }
        previous_end = mention.end();
    }
    Ok(())
}

pub fn validate_file_size(size: u64, max: u64) -> Result<(), ValidationError> {
    if size > max {
        return Err(ValidationError::FileTooLarge { size, max });
    }
    Ok(())
}
