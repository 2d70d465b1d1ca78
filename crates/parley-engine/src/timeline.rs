//! Ordered message timeline.
//!
//! Messages live in an arena keyed by id; `order` records arrival order.
//! The timeline is append-only apart from removal, which keeps the relative
//! order of the survivors. Reply links are stored as ids and resolved by
//! lookup, so removing a message never leaves a dangling reference.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use parley_shared::types::{AttachmentId, Mention, MessageId, ParticipantId};

/// Where a message was first created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MessageOrigin {
    /// Optimistically appended by a local send.
    Local,
    /// Received from the transport.
    Remote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub author_id: ParticipantId,
    /// Display name at the time the message was created.
    pub author_display_name: String,
    pub body: String,
    pub mentions: Vec<Mention>,
    /// `body` with mentions wrapped and newlines converted.
    pub markup: String,
    /// Attachments owned by this message, in upload order.
    pub attachment_ids: Vec<AttachmentId>,
    pub reply_to: Option<MessageId>,
    /// `None` until the transport confirms the message.
    pub sent_at: Option<DateTime<Utc>>,
    pub origin: MessageOrigin,
    /// Authorship as decided when the message was created.
    pub is_mine: bool,
}

impl Message {
    /// Whether this entry was created by a local send.
    pub fn is_local_echo(&self) -> bool {
        self.origin == MessageOrigin::Local
    }

    pub fn is_confirmed(&self) -> bool {
        self.sent_at.is_some()
    }

    /// A local send still waiting for its echo.
    pub fn is_unconfirmed_local(&self) -> bool {
        self.is_local_echo() && !self.is_confirmed()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageTimeline {
    messages: HashMap<MessageId, Message>,
    order: Vec<MessageId>,
    // Ids removed by delete or rollback.
    removed: HashSet<MessageId>,
}

impl MessageTimeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message at the end. Ids already present or previously
    /// removed are rejected.
    pub fn append(&mut self, message: Message) -> bool {
        if self.messages.contains_key(&message.id) {
            debug!(message_id = %message.id, "Message already in timeline");
            return false;
        }
        if self.removed.contains(&message.id) {
            debug!(message_id = %message.id, "Message was removed earlier, not re-adding");
            return false;
        }
        self.order.push(message.id.clone());
        self.messages.insert(message.id.clone(), message);
        true
    }

    pub fn find_by_id(&self, id: &MessageId) -> Option<&Message> {
        self.messages.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &MessageId) -> Option<&mut Message> {
        self.messages.get_mut(id)
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.messages.contains_key(id)
    }

    pub fn is_removed(&self, id: &MessageId) -> bool {
        self.removed.contains(id)
    }

    /// Mark an unconfirmed local message as sent. Anything else is left
    /// alone.
    pub fn confirm(&mut self, id: &MessageId, sent_at: DateTime<Utc>) -> bool {
        match self.messages.get_mut(id) {
            Some(message) if message.is_unconfirmed_local() => {
                message.sent_at = Some(sent_at);
                true
            }
            _ => false,
        }
    }

    /// Remove a message, remembering its id.
    pub fn remove_by_id(&mut self, id: &MessageId) -> Option<Message> {
        let message = self.messages.remove(id)?;
        self.order.retain(|m| m != id);
        self.removed.insert(id.clone());
        Some(message)
    }

    /// The message `message` replies to, if it is still in the timeline.
    pub fn reply_target(&self, message: &Message) -> Option<&Message> {
        message.reply_to.as_ref().and_then(|id| self.messages.get(id))
    }

    /// Keep a reply link only if the target is currently known.
    pub fn resolve_reply(&self, reply_id: Option<&MessageId>) -> Option<MessageId> {
        reply_id.filter(|id| self.contains(id)).cloned()
    }

    /// Messages in timeline order.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.order.iter().filter_map(|id| self.messages.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
