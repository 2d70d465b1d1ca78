//! Mention rendering.
//!
//! Mentions are applied left to right. Every wrap inserts an opening and a
//! closing marker, so each later span is shifted by the total marker length
//! inserted before it. The shift is tracked as a running sum instead of
//! re-scanning the output.
//!
//! Spans are expected sorted by offset and non-overlapping. Locally composed
//! drafts are checked by `parley_shared::validation`; a span from the
//! transport that starts before the previous one ends is skipped.

use serde::{Deserialize, Serialize};
use tracing::debug;

use parley_shared::constants::{DEFAULT_MENTION_CLOSE, DEFAULT_MENTION_OPEN, MARKUP_LINE_BREAK};
use parley_shared::types::Mention;

/// Markers wrapped around every mention span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionMarkers {
    pub open: String,
    pub close: String,
}

impl MentionMarkers {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    fn inserted_len(&self) -> usize {
        self.open.len() + self.close.len()
    }
}

impl Default for MentionMarkers {
    fn default() -> Self {
        Self::new(DEFAULT_MENTION_OPEN, DEFAULT_MENTION_CLOSE)
    }
}

/// Wrap each mention span of `text` in `markers`.
///
/// Offsets count chars. A span starting past the end of the text, or before
/// the end of the previous span, is skipped. A span running past the end is
/// cut at the end.
pub fn render(text: &str, mentions: &[Mention], markers: &MentionMarkers) -> String {
    // Byte position of every char index, plus the end of the text.
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let last = boundaries.len() - 1;

    let mut out = String::with_capacity(text.len() + mentions.len() * markers.inserted_len());
    out.push_str(text);

    let mut shift = 0;
    let mut covered = 0;
    for mention in mentions {
        if mention.offset < covered {
            debug!(
                offset = mention.offset,
                previous_end = covered,
                participant = %mention.participant_id,
                "Mention overlaps or precedes previous span, skipping"
            );
            continue;
        }
        let Some(&start) = boundaries.get(mention.offset) else {
            debug!(
                offset = mention.offset,
                len = last,
                participant = %mention.participant_id,
                "Mention starts past end of text, skipping"
            );
            continue;
        };
        let end_index = mention.end().min(last);
        let end = boundaries[end_index];
        covered = end_index;

        out.insert_str(end + shift, &markers.close);
        out.insert_str(start + shift, &markers.open);
        shift += markers.inserted_len();
    }

    out
}

/// [`render`] followed by converting newlines to markup line breaks.
pub fn render_markup(text: &str, mentions: &[Mention], markers: &MentionMarkers) -> String {
    render(text, mentions, markers).replace('\n', MARKUP_LINE_BREAK)
}
