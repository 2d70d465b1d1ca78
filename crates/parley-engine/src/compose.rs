//! Draft composition.
//!
//! A composer produces plain text interleaved with mention chips. The
//! builder flattens that into a body plus mention spans whose offsets count
//! chars, which is what the renderer and the transport expect.

use std::path::PathBuf;

use parley_shared::types::{Mention, MessageId, ParticipantId};

/// A file picked for upload, not yet tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftFile {
    pub file_name: String,
    pub size_bytes: Option<u64>,
    pub path: PathBuf,
}

/// Everything needed for one local send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub text: String,
    pub mentions: Vec<Mention>,
    pub reply_to: Option<MessageId>,
    pub files: Vec<DraftFile>,
}

impl Draft {
    /// Plain text draft with no mentions.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn builder() -> DraftBuilder {
        DraftBuilder::default()
    }

    pub fn replying_to(mut self, id: MessageId) -> Self {
        self.reply_to = Some(id);
        self
    }

    pub fn with_file(mut self, file: DraftFile) -> Self {
        self.files.push(file);
        self
    }
}

#[derive(Debug, Default)]
pub struct DraftBuilder {
    text: String,
    chars: usize,
    mentions: Vec<Mention>,
}

impl DraftBuilder {
    /// Append a plain text segment.
    pub fn text(mut self, segment: &str) -> Self {
        self.chars += segment.chars().count();
        self.text.push_str(segment);
        self
    }

    /// Append a mention chip displaying `value`.
    pub fn mention(mut self, participant_id: ParticipantId, value: &str) -> Self {
        let length = value.chars().count();
        self.mentions.push(Mention {
            offset: self.chars,
            length,
            participant_id,
        });
        self.chars += length;
        self.text.push_str(value);
        self
    }

    /// Finish the draft. A single trailing newline left by the editor is
    /// dropped.
    pub fn build(mut self) -> Draft {
        if self.text.ends_with('\n') {
            let last_mention_end = self.mentions.last().map_or(0, Mention::end);
            if self.chars > last_mention_end {
                self.text.pop();
            }
        }
        Draft {
            text: self.text,
            mentions: self.mentions,
            ..Draft::default()
        }
    }
}

/// Typing signal to send when the composer content changes.
///
/// `Some(true)` when it goes from blank to non-blank, `Some(false)` when it
/// becomes blank, `None` when nothing needs to be sent.
pub fn typing_transition(previous: &str, current: &str) -> Option<bool> {
    let was_blank = previous.trim().is_empty();
    let is_blank = current.trim().is_empty();
    match (was_blank, is_blank) {
        (true, false) => Some(true),
        (false, true) => Some(false),
        _ => None,
    }
}
