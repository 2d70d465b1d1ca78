//! Read-only view of the state, shaped for rendering.

use chrono::{DateTime, Utc};
use serde::Serialize;

use parley_shared::types::{Mention, MessageId, ParticipantId};

use crate::attachments::Attachment;
use crate::participants::Participant;
use crate::state::ChatState;
use crate::timeline::Message;

/// Which actions a message's menu offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MessageActions {
    pub delete: bool,
    pub edit: bool,
    pub reply: bool,
    pub download: bool,
}

impl MessageActions {
    /// Own messages can be edited and deleted, other people's replied to.
    /// Download is offered whenever a file is ready.
    pub fn for_message(message: &Message, attachments: &[&Attachment]) -> Self {
        Self {
            delete: message.is_mine,
            edit: message.is_mine,
            reply: !message.is_mine,
            download: attachments.iter().any(|a| a.url().is_some()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyPreview {
    pub id: MessageId,
    pub author_display_name: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: MessageId,
    pub author_id: ParticipantId,
    pub author_display_name: String,
    /// Color of the author if still present.
    pub author_color: Option<String>,
    pub body: String,
    pub markup: String,
    pub mentions: Vec<Mention>,
    pub attachments: Vec<Attachment>,
    pub reply: Option<ReplyPreview>,
    pub sent_at: Option<DateTime<Utc>>,
    pub is_mine: bool,
    pub is_pending: bool,
    pub actions: MessageActions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSnapshot {
    pub self_id: Option<ParticipantId>,
    pub participants: Vec<Participant>,
    pub messages: Vec<MessageView>,
    /// Typing summary line; empty when nobody types.
    pub typing: String,
}

impl ChatState {
    pub fn snapshot(&self) -> ChatSnapshot {
        ChatSnapshot {
            self_id: self.directory.self_id().cloned(),
            participants: self.directory.iter().cloned().collect(),
            messages: self.timeline.iter().map(|m| self.message_view(m)).collect(),
            typing: self.directory.typing_summary(),
        }
    }

    fn message_view(&self, message: &Message) -> MessageView {
        let attachments = self.attachments_of(message);
        let reply = self.timeline.reply_target(message).map(|target| ReplyPreview {
            id: target.id.clone(),
            author_display_name: target.author_display_name.clone(),
            body: target.body.clone(),
        });

        MessageView {
            id: message.id.clone(),
            author_id: message.author_id.clone(),
            author_display_name: message.author_display_name.clone(),
            author_color: self
                .directory
                .get(&message.author_id)
                .map(|p| p.color_tag.clone()),
            body: message.body.clone(),
            markup: message.markup.clone(),
            mentions: message.mentions.clone(),
            actions: MessageActions::for_message(message, &attachments),
            attachments: attachments.into_iter().cloned().collect(),
            reply,
            sent_at: message.sent_at,
            is_mine: message.is_mine,
            is_pending: message.is_unconfirmed_local(),
        }
    }
}
