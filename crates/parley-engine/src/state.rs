//! The engine's complete state and the local commands that mutate it.
//!
//! Transport events go through [`ChatState::apply`] (see `reducer`). Local
//! commands (send, abort, typing) live here and return the payload the
//! client hands to the transport. Both run one at a time to completion.

use tracing::{debug, info};

use parley_shared::protocol::{MessageEdit, MessageRef, OutboundMessage, OutgoingFile, SendAck};
use parley_shared::types::{AttachmentId, Mention, MessageId};
use parley_shared::validation::{validate_mentions, validate_message_content};

use crate::attachments::{Attachment, AttachmentTracker};
use crate::compose::{Draft, DraftFile};
use crate::error::{EngineError, Result};
use crate::mention::{render_markup, MentionMarkers};
use crate::participants::ParticipantDirectory;
use crate::timeline::{Message, MessageOrigin, MessageTimeline};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatState {
    pub(crate) directory: ParticipantDirectory,
    pub(crate) timeline: MessageTimeline,
    pub(crate) attachments: AttachmentTracker,
    pub(crate) markers: MentionMarkers,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_markers(markers: MentionMarkers) -> Self {
        Self {
            markers,
            ..Self::default()
        }
    }

    pub fn directory(&self) -> &ParticipantDirectory {
        &self.directory
    }

    pub fn timeline(&self) -> &MessageTimeline {
        &self.timeline
    }

    pub fn attachments(&self) -> &AttachmentTracker {
        &self.attachments
    }

    pub fn markers(&self) -> &MentionMarkers {
        &self.markers
    }

    pub fn is_identified(&self) -> bool {
        self.directory.self_id().is_some()
    }

    /// Attachments of a message, in upload order.
    pub fn attachments_of(&self, message: &Message) -> Vec<&Attachment> {
        message
            .attachment_ids
            .iter()
            .filter_map(|id| self.attachments.get(id))
            .collect()
    }

    pub(crate) fn markup(&self, text: &str, mentions: &[Mention]) -> String {
        render_markup(text, mentions, &self.markers)
    }

    // -----------------------------------------------------------------------
    // Local commands
    // -----------------------------------------------------------------------

    /// Optimistically append a local message and return what to send.
    ///
    /// The message gets a fresh id and its files get fresh attachment ids in
    /// the Pending state. Refused until the local participant is known.
    pub fn append_local(&mut self, draft: Draft) -> Result<OutboundMessage> {
        let me = self
            .directory
            .self_participant()
            .cloned()
            .ok_or(EngineError::NotIdentified)?;

        validate_message_content(&draft.text, draft.files.len())?;
        validate_mentions(&draft.text, &draft.mentions)?;

        let message_id = MessageId::new();
        let reply_to = self.timeline.resolve_reply(draft.reply_to.as_ref());

        let mut files = Vec::with_capacity(draft.files.len());
        let mut attachment_ids = Vec::with_capacity(draft.files.len());
        for DraftFile {
            file_name,
            size_bytes,
            path,
        } in draft.files
        {
            let attachment_id = AttachmentId::new();
            self.attachments.insert(Attachment::pending(
                attachment_id.clone(),
                file_name.clone(),
                size_bytes,
                message_id.clone(),
            ));
            attachment_ids.push(attachment_id.clone());
            files.push(OutgoingFile {
                attachment_id,
                file_name,
                size_bytes,
                path,
            });
        }

        let message = Message {
            id: message_id.clone(),
            author_id: me.id.clone(),
            author_display_name: me.display_name.clone(),
            body: draft.text.clone(),
            markup: self.markup(&draft.text, &draft.mentions),
            mentions: draft.mentions.clone(),
            attachment_ids,
            reply_to: reply_to.clone(),
            sent_at: None,
            origin: MessageOrigin::Local,
            is_mine: true,
        };
        self.timeline.append(message);
        self.directory.set_typing(&me.id, false);

        info!(
            message_id = %message_id,
            files = files.len(),
            "Local message appended"
        );

        Ok(OutboundMessage {
            message_id,
            text: draft.text,
            mentions: draft.mentions,
            reply_id: reply_to,
            files,
        })
    }

    /// Seed attachment metadata from the transport's send acknowledgment.
    ///
    /// Sizes from the manifest win; files of the message that the manifest
    /// does not list were refused by the transport and are marked Failed.
    pub fn apply_ack(&mut self, ack: &SendAck) -> bool {
        let Some(message) = self.timeline.find_by_id(&ack.message_id) else {
            debug!(message_id = %ack.message_id, "Ack for unknown message");
            return false;
        };
        let owned = message.attachment_ids.clone();

        let mut changed = false;
        for id in &owned {
            let entry = ack.files.iter().find(|f| f.id == *id);
            let Some(attachment) = self.attachments.get_mut(id) else {
                continue;
            };
            match entry {
                Some(entry) => {
                    if entry.size_bytes.is_some() && attachment.size_bytes != entry.size_bytes {
                        attachment.size_bytes = entry.size_bytes;
                        changed = true;
                    }
                }
                None => {
                    debug!(attachment_id = %id, "File missing from manifest, marking failed");
                    changed |= attachment.fail();
                }
            }
        }
        changed
    }

    /// Cancel an upload. The state flips immediately, whatever the
    /// transport does with the cancellation request.
    pub fn abort_upload(&mut self, id: &AttachmentId) -> bool {
        let aborted = self.attachments.abort(id);
        if aborted {
            info!(attachment_id = %id, "Upload aborted");
        } else {
            debug!(attachment_id = %id, "Abort ignored, attachment unknown or finished");
        }
        aborted
    }

    /// Set the local participant's typing flag.
    pub fn set_local_typing(&mut self, typing: bool) -> bool {
        match self.directory.self_id().cloned() {
            Some(me) => self.directory.set_typing(&me, typing),
            None => false,
        }
    }

    /// Build an edit request for one of our own messages.
    pub fn prepare_edit(
        &self,
        id: &MessageId,
        text: String,
        mentions: Vec<Mention>,
    ) -> Result<MessageEdit> {
        let message = self.own_message(id)?;
        validate_message_content(&text, message.attachment_ids.len())?;
        validate_mentions(&text, &mentions)?;
        Ok(MessageEdit {
            id: id.clone(),
            text,
            mentions,
        })
    }

    /// Build a delete request for one of our own messages.
    pub fn prepare_delete(&self, id: &MessageId) -> Result<MessageRef> {
        self.own_message(id)?;
        Ok(MessageRef { id: id.clone() })
    }

    fn own_message(&self, id: &MessageId) -> Result<&Message> {
        match self.timeline.find_by_id(id) {
            Some(message) if message.is_mine => Ok(message),
            _ => {
                debug!(message_id = %id, "Message unknown or not ours");
                Err(EngineError::NotOwnMessage(id.clone()))
            }
        }
    }

    /// `(file name, url)` of every Ready attachment of a message.
    pub fn downloadable_files(&self, id: &MessageId) -> Vec<(String, String)> {
        let Some(message) = self.timeline.find_by_id(id) else {
            return Vec::new();
        };
        self.attachments_of(message)
            .into_iter()
            .filter_map(|a| a.url().map(|url| (a.file_name.clone(), url.to_string())))
            .collect()
    }
}
