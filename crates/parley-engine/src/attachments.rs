//! Per-file upload lifecycle.
//!
//! ```text
//! Pending ──progress──▶ Uploading ──ready──▶ Ready
//!    │                     │  └────error───▶ Failed
//!    └───────abort─────────┴───────────────▶ Aborted
//! ```
//!
//! Ready, Failed and Aborted are terminal: every later transition attempt is
//! a no-op. Abort is local-state-authoritative, so a transport event that
//! arrives for an aborted file afterwards is ignored here.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::debug;

use parley_shared::constants::MAX_PROGRESS;
use parley_shared::types::{AttachmentId, MessageId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum AttachmentState {
    Pending,
    Uploading { progress: u8 },
    Ready { url: String },
    Aborted,
    Failed,
}

impl AttachmentState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ready { .. } | Self::Aborted | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: AttachmentId,
    pub file_name: String,
    pub size_bytes: Option<u64>,
    pub state: AttachmentState,
    pub owner_message_id: MessageId,
}

impl Attachment {
    /// A file we are about to upload.
    pub fn pending(
        id: AttachmentId,
        file_name: impl Into<String>,
        size_bytes: Option<u64>,
        owner_message_id: MessageId,
    ) -> Self {
        Self {
            id,
            file_name: file_name.into(),
            size_bytes,
            state: AttachmentState::Pending,
            owner_message_id,
        }
    }

    /// A file some other participant already uploaded.
    pub fn ready(
        id: AttachmentId,
        file_name: impl Into<String>,
        size_bytes: Option<u64>,
        url: impl Into<String>,
        owner_message_id: MessageId,
    ) -> Self {
        Self {
            id,
            file_name: file_name.into(),
            size_bytes,
            state: AttachmentState::Ready { url: url.into() },
            owner_message_id,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match &self.state {
            AttachmentState::Ready { url } => Some(url),
            _ => None,
        }
    }

    /// Record upload progress. Progress never moves backwards.
    pub fn record_progress(&mut self, progress: u32) -> bool {
        let progress = progress.min(u32::from(MAX_PROGRESS)) as u8;
        match self.state {
            AttachmentState::Pending => {
                self.state = AttachmentState::Uploading { progress };
                true
            }
            AttachmentState::Uploading { progress: current } if progress > current => {
                self.state = AttachmentState::Uploading { progress };
                true
            }
            _ => false,
        }
    }

    pub fn mark_ready(&mut self, url: impl Into<String>, size_bytes: Option<u64>) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = AttachmentState::Ready { url: url.into() };
        if size_bytes.is_some() {
            self.size_bytes = size_bytes;
        }
        true
    }

    pub fn abort(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = AttachmentState::Aborted;
        true
    }

    pub fn fail(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        self.state = AttachmentState::Failed;
        true
    }
}

/// All attachments known to the session, keyed by attachment id.
///
/// Ids that were discarded together with their message are retired and can
/// never be inserted again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttachmentTracker {
    attachments: HashMap<AttachmentId, Attachment>,
    retired: HashSet<AttachmentId>,
}

impl AttachmentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new attachment. Returns `false` if the id is already known or
    /// retired.
    pub fn insert(&mut self, attachment: Attachment) -> bool {
        if self.attachments.contains_key(&attachment.id) || self.retired.contains(&attachment.id) {
            debug!(attachment_id = %attachment.id, "Attachment already known, not re-creating");
            return false;
        }
        self.attachments.insert(attachment.id.clone(), attachment);
        true
    }

    pub fn get(&self, id: &AttachmentId) -> Option<&Attachment> {
        self.attachments.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &AttachmentId) -> Option<&mut Attachment> {
        self.attachments.get_mut(id)
    }

    pub fn contains(&self, id: &AttachmentId) -> bool {
        self.attachments.contains_key(id)
    }

    pub fn is_retired(&self, id: &AttachmentId) -> bool {
        self.retired.contains(id)
    }

    pub fn owner_of(&self, id: &AttachmentId) -> Option<&MessageId> {
        self.attachments.get(id).map(|a| &a.owner_message_id)
    }

    /// Apply a progress report. The attachment must belong to `owner`.
    pub fn progress(&mut self, id: &AttachmentId, owner: &MessageId, progress: u32) -> bool {
        match self.owned_mut(id, owner) {
            Some(attachment) => attachment.record_progress(progress),
            None => false,
        }
    }

    pub fn ready(
        &mut self,
        id: &AttachmentId,
        owner: &MessageId,
        url: &str,
        size_bytes: Option<u64>,
    ) -> bool {
        match self.owned_mut(id, owner) {
            Some(attachment) => attachment.mark_ready(url, size_bytes),
            None => false,
        }
    }

    pub fn abort(&mut self, id: &AttachmentId) -> bool {
        self.attachments.get_mut(id).map_or(false, Attachment::abort)
    }

    pub fn fail(&mut self, id: &AttachmentId) -> bool {
        self.attachments.get_mut(id).map_or(false, Attachment::fail)
    }

    /// Drop the given attachments and retire their ids.
    pub fn discard<'a>(&mut self, ids: impl IntoIterator<Item = &'a AttachmentId>) -> usize {
        let mut removed = 0;
        for id in ids {
            if self.attachments.remove(id).is_some() {
                removed += 1;
            }
            self.retired.insert(id.clone());
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }

    fn owned_mut(&mut self, id: &AttachmentId, owner: &MessageId) -> Option<&mut Attachment> {
        match self.attachments.get_mut(id) {
            Some(attachment) if attachment.owner_message_id == *owner => Some(attachment),
            Some(attachment) => {
                debug!(
                    attachment_id = %id,
                    owner = %attachment.owner_message_id,
                    claimed_owner = %owner,
                    "Attachment owner mismatch, ignoring"
                );
                None
            }
            None => None,
        }
    }
}
