//! Single entry point for transport events.
//!
//! Every event mutates at most the component that owns it. Missing ids,
//! duplicate echoes and events for finished uploads are silent no-ops;
//! nothing here returns an error. The result depends only on the state and
//! the event, so replaying a sequence from the same starting state always
//! produces the same state.

use tracing::{debug, info, trace, warn};

use parley_shared::protocol::{
    FileData, FileProgress, FileReady, MessageEdit, NewMessage, SessionEvent, TransportFailure,
};
use parley_shared::types::{AttachmentId, ErrorCode, MessageId};

use crate::attachments::Attachment;
use crate::state::ChatState;
use crate::timeline::{Message, MessageOrigin};

/// What applying one event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// State changed.
    Applied,
    /// Nothing to do: stale id, duplicate, terminal attachment, unknown kind.
    Ignored,
    /// A transport error the engine does not handle, for the caller to show.
    Surfaced(TransportFailure),
}

impl Outcome {
    pub fn changed(&self) -> bool {
        matches!(self, Self::Applied)
    }

    fn from_changed(changed: bool) -> Self {
        if changed {
            Self::Applied
        } else {
            Self::Ignored
        }
    }
}

/// Functional form of [`ChatState::apply`].
pub fn apply(mut state: ChatState, event: &SessionEvent) -> (ChatState, Outcome) {
    let outcome = state.apply(event);
    (state, outcome)
}

impl ChatState {
    /// Apply one transport event.
    pub fn apply(&mut self, event: &SessionEvent) -> Outcome {
        trace!(kind = event.kind(), "Applying session event");

        match event {
            SessionEvent::SelfIdentified(info) => {
                Outcome::from_changed(self.directory.identify_self(info))
            }
            SessionEvent::ParticipantJoined(info) => {
                Outcome::from_changed(self.directory.join(info))
            }
            SessionEvent::ParticipantLeft(participant) => {
                Outcome::from_changed(self.directory.leave(&participant.id))
            }
            SessionEvent::TypingChanged(change) => Outcome::from_changed(
                self.directory
                    .set_typing(&change.participant_id, change.typing),
            ),
            SessionEvent::MessageCreated(message) => self.on_message_created(message),
            SessionEvent::MessageEdited(edit) => self.on_message_edited(edit),
            SessionEvent::MessageDeleted(message) => {
                Outcome::from_changed(self.remove_message(&message.id))
            }
            SessionEvent::AttachmentProgress(progress) => self.on_progress(progress),
            SessionEvent::AttachmentReady(ready) => self.on_ready(ready),
            SessionEvent::TransportError(failure) => self.on_transport_error(failure),
            SessionEvent::Unknown => {
                debug!("Ignoring unknown session event kind");
                Outcome::Ignored
            }
        }
    }

    /// Reconcile the echo of a local send: fill `sent_at` and the urls of
    /// its uploaded files. Anything but an unconfirmed local message is left
    /// untouched.
    pub fn reconcile_echo(
        &mut self,
        id: &MessageId,
        sent_at: chrono::DateTime<chrono::Utc>,
        files: &[FileData],
    ) -> bool {
        if !self.timeline.confirm(id, sent_at) {
            return false;
        }
        for file in files {
            if let Some(url) = &file.url {
                self.attachments.ready(&file.id, id, url, file.size);
            }
        }
        info!(message_id = %id, "Local message confirmed");
        true
    }

    fn on_message_created(&mut self, event: &NewMessage) -> Outcome {
        if self.timeline.is_removed(&event.id) {
            debug!(message_id = %event.id, "Message was removed, ignoring creation");
            return Outcome::Ignored;
        }

        if let Some(existing) = self.timeline.find_by_id(&event.id) {
            if !existing.is_unconfirmed_local() {
                debug!(message_id = %event.id, "Duplicate message creation ignored");
                return Outcome::Ignored;
            }
            let Some(sent_at) = event.sent_at else {
                debug!(message_id = %event.id, "Echo without timestamp, waiting for another");
                return Outcome::Ignored;
            };
            let files = event.attachments.as_deref().unwrap_or_default();
            return Outcome::from_changed(self.reconcile_echo(&event.id, sent_at, files));
        }

        let mut attachment_ids = Vec::new();
        for file in event.attachments.iter().flatten() {
            let attachment = match &file.url {
                Some(url) => Attachment::ready(
                    file.id.clone(),
                    file.name.clone(),
                    file.size,
                    url.clone(),
                    event.id.clone(),
                ),
                None => Attachment::pending(
                    file.id.clone(),
                    file.name.clone(),
                    file.size,
                    event.id.clone(),
                ),
            };
            if self.attachments.insert(attachment) {
                attachment_ids.push(file.id.clone());
            }
        }

        let message = Message {
            id: event.id.clone(),
            author_id: event.author_id.clone(),
            author_display_name: event.display_name.clone(),
            body: event.text.clone(),
            markup: self.markup(&event.text, &event.mentions),
            mentions: event.mentions.clone(),
            attachment_ids,
            reply_to: self.timeline.resolve_reply(event.reply_id.as_ref()),
            sent_at: event.sent_at,
            origin: MessageOrigin::Remote,
            is_mine: self.directory.is_self(&event.author_id),
        };
        self.timeline.append(message);
        debug!(message_id = %event.id, author = %event.author_id, "Message appended");
        Outcome::Applied
    }

    fn on_message_edited(&mut self, edit: &MessageEdit) -> Outcome {
        let markup = self.markup(&edit.text, &edit.mentions);
        match self.timeline.get_mut(&edit.id) {
            Some(message) => {
                message.body = edit.text.clone();
                message.mentions = edit.mentions.clone();
                message.markup = markup;
                debug!(message_id = %edit.id, "Message edited");
                Outcome::Applied
            }
            None => {
                debug!(message_id = %edit.id, "Edit for unknown message ignored");
                Outcome::Ignored
            }
        }
    }

    fn on_progress(&mut self, progress: &FileProgress) -> Outcome {
        let changed =
            self.attachments
                .progress(&progress.id, &progress.owner_message_id, progress.progress);
        if !changed {
            trace!(attachment_id = %progress.id, "Progress ignored");
        }
        Outcome::from_changed(changed)
    }

    fn on_ready(&mut self, ready: &FileReady) -> Outcome {
        let owner = &ready.owner_message_id;
        if self.timeline.is_removed(owner) || self.attachments.is_retired(&ready.id) {
            debug!(attachment_id = %ready.id, "File ready for removed message ignored");
            return Outcome::Ignored;
        }

        if self.attachments.contains(&ready.id) {
            let changed = self
                .attachments
                .ready(&ready.id, owner, &ready.url, ready.size_bytes);
            if changed {
                info!(attachment_id = %ready.id, "Attachment ready");
            } else {
                debug!(attachment_id = %ready.id, "Ready ignored, attachment already finished");
            }
            return Outcome::from_changed(changed);
        }

        let attachment = Attachment::ready(
            ready.id.clone(),
            ready.file_name.clone(),
            ready.size_bytes,
            ready.url.clone(),
            owner.clone(),
        );

        match self.timeline.find_by_id(owner).map(|m| m.origin) {
            Some(MessageOrigin::Remote) => {
                // Further file of a message we already show.
                self.attachments.insert(attachment);
                if let Some(message) = self.timeline.get_mut(owner) {
                    message.attachment_ids.push(ready.id.clone());
                }
                Outcome::Applied
            }
            Some(MessageOrigin::Local) => {
                debug!(attachment_id = %ready.id, "Unknown file for local message ignored");
                Outcome::Ignored
            }
            None => {
                // First sight of a foreign file: the message arrives with it.
                self.attachments.insert(attachment);
                let message = Message {
                    id: owner.clone(),
                    author_id: ready.author_id.clone(),
                    author_display_name: ready.display_name.clone(),
                    body: ready.text.clone(),
                    markup: self.markup(&ready.text, &[]),
                    mentions: Vec::new(),
                    attachment_ids: vec![ready.id.clone()],
                    reply_to: None,
                    sent_at: Some(ready.sent_at),
                    origin: MessageOrigin::Remote,
                    is_mine: self.directory.is_self(&ready.author_id),
                };
                self.timeline.append(message);
                debug!(message_id = %owner, attachment_id = %ready.id, "File message materialized");
                Outcome::Applied
            }
        }
    }

    fn on_transport_error(&mut self, failure: &TransportFailure) -> Outcome {
        if failure.code != ErrorCode::UploadFailed {
            warn!(
                code = %failure.code,
                target = ?failure.target_id,
                message = ?failure.message,
                "Transport error"
            );
            return Outcome::Surfaced(failure.clone());
        }

        let Some(target) = &failure.target_id else {
            warn!("Upload failure without target");
            return Outcome::Surfaced(failure.clone());
        };

        let attachment_id = AttachmentId(target.clone());
        let owner = match self.attachments.get(&attachment_id) {
            Some(attachment) if attachment.state.is_terminal() => {
                debug!(attachment_id = %attachment_id, "Upload failure for finished attachment ignored");
                return Outcome::Ignored;
            }
            Some(attachment) => attachment.owner_message_id.clone(),
            // Some transports report the message id instead.
            None => MessageId(target.clone()),
        };

        let failed = self.attachments.fail(&attachment_id);
        let unconfirmed = self
            .timeline
            .find_by_id(&owner)
            .map_or(false, Message::is_unconfirmed_local);

        if unconfirmed {
            warn!(message_id = %owner, target = %target, "Upload failed, rolling back send");
            self.remove_message(&owner);
            return Outcome::Applied;
        }

        if !failed {
            debug!(target = %target, "Upload failure for unknown target ignored");
        }
        Outcome::from_changed(failed)
    }

    /// Remove a message together with the attachments it owns.
    fn remove_message(&mut self, id: &MessageId) -> bool {
        match self.timeline.remove_by_id(id) {
            Some(message) => {
                let discarded = self.attachments.discard(&message.attachment_ids);
                debug!(message_id = %id, attachments = discarded, "Message removed");
                true
            }
            None => {
                debug!(message_id = %id, "Removal of unknown message ignored");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use parley_shared::protocol::{
        MessageRef, ParticipantInfo, ParticipantRef, SendAck, TypingChange,
    };
    use parley_shared::types::{Mention, ParticipantId};

    use super::*;
    use crate::attachments::AttachmentState;
    use crate::compose::{Draft, DraftFile};

    fn at(secs: i64) -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn info(id: &str, name: &str) -> ParticipantInfo {
        ParticipantInfo {
            id: ParticipantId::from(id),
            display_name: name.to_string(),
        }
    }

    fn session() -> ChatState {
        let mut state = ChatState::new();
        state.apply(&SessionEvent::SelfIdentified(info("me", "Dee")));
        state.apply(&SessionEvent::ParticipantJoined(info("p1", "Ann")));
        state
    }

    fn created(id: &str, author: &str, text: &str) -> NewMessage {
        NewMessage {
            id: MessageId::from(id),
            author_id: ParticipantId::from(author),
            display_name: "Ann".to_string(),
            text: text.to_string(),
            mentions: Vec::new(),
            reply_id: None,
            sent_at: Some(at(0)),
            attachments: None,
        }
    }

    fn ready(id: &str, owner: &str) -> FileReady {
        FileReady {
            id: AttachmentId::from(id),
            owner_message_id: MessageId::from(owner),
            author_id: ParticipantId::from("p1"),
            display_name: "Ann".to_string(),
            text: String::new(),
            sent_at: at(5),
            file_name: "photo.jpg".to_string(),
            size_bytes: Some(2048),
            url: format!("https://files/{id}"),
        }
    }

    fn upload_failed(target: &str) -> SessionEvent {
        SessionEvent::TransportError(TransportFailure {
            code: ErrorCode::UploadFailed,
            target_id: Some(target.to_string()),
            message: None,
        })
    }

    fn local_with_file(state: &mut ChatState) -> (MessageId, AttachmentId) {
        let outbound = state
            .append_local(Draft::text("look").with_file(DraftFile {
                file_name: "a.png".to_string(),
                size_bytes: Some(10),
                path: "/tmp/a.png".into(),
            }))
            .unwrap();
        (outbound.message_id, outbound.files[0].attachment_id.clone())
    }

    #[test]
    fn test_remote_message_is_appended_once() {
        let mut state = session();
        let event = SessionEvent::MessageCreated(created("m1", "p1", "hello"));

        assert_eq!(state.apply(&event), Outcome::Applied);
        assert_eq!(state.apply(&event), Outcome::Ignored);

        let message = state.timeline.find_by_id(&MessageId::from("m1")).unwrap();
        assert_eq!(message.origin, MessageOrigin::Remote);
        assert!(!message.is_mine);
        assert_eq!(state.timeline.len(), 1);
    }

    #[test]
    fn test_echo_confirms_local_message() {
        let mut state = session();
        let outbound = state.append_local(Draft::text("hi")).unwrap();
        let other = state.append_local(Draft::text("still sending")).unwrap();

        let mut echo = created(outbound.message_id.as_str(), "me", "hi");
        echo.sent_at = None;
        assert_eq!(
            state.apply(&SessionEvent::MessageCreated(echo.clone())),
            Outcome::Ignored
        );

        echo.sent_at = Some(at(3));
        assert_eq!(state.apply(&SessionEvent::MessageCreated(echo.clone())), Outcome::Applied);
        assert_eq!(state.apply(&SessionEvent::MessageCreated(echo)), Outcome::Ignored);

        let message = state.timeline.find_by_id(&outbound.message_id).unwrap();
        assert_eq!(message.sent_at, Some(at(3)));
        assert_eq!(message.origin, MessageOrigin::Local);

        let pending = state.timeline.find_by_id(&other.message_id).unwrap();
        assert_eq!(pending.sent_at, None);
        assert!(pending.is_unconfirmed_local());
        assert_eq!(state.timeline.len(), 2);
    }

    #[test]
    fn test_echo_carries_uploaded_urls() {
        let mut state = session();
        let (message_id, attachment_id) = local_with_file(&mut state);

        let mut echo = created(message_id.as_str(), "me", "look");
        echo.attachments = Some(vec![FileData {
            id: attachment_id.clone(),
            name: "a.png".to_string(),
            size: Some(10),
            url: Some("https://files/a".to_string()),
        }]);
        state.apply(&SessionEvent::MessageCreated(echo));

        assert_eq!(
            state.attachments.get(&attachment_id).unwrap().url(),
            Some("https://files/a")
        );
    }

    #[test]
    fn test_authorship_is_captured_at_creation() {
        let mut state = ChatState::new();
        state.apply(&SessionEvent::MessageCreated(created("early", "me", "before identity")));
        state.apply(&SessionEvent::SelfIdentified(info("me", "Dee")));
        state.apply(&SessionEvent::MessageCreated(created("late", "me", "after identity")));

        assert!(!state.timeline.find_by_id(&MessageId::from("early")).unwrap().is_mine);
        assert!(state.timeline.find_by_id(&MessageId::from("late")).unwrap().is_mine);
    }

    #[test]
    fn test_edit_replaces_body_and_markup() {
        let mut state = session();
        state.apply(&SessionEvent::MessageCreated(created("m1", "p1", "old")));

        let edit = MessageEdit {
            id: MessageId::from("m1"),
            text: "hi Dee\nbye".to_string(),
            mentions: vec![Mention::new(3, 3, "me")],
        };
        assert_eq!(state.apply(&SessionEvent::MessageEdited(edit)), Outcome::Applied);

        let message = state.timeline.find_by_id(&MessageId::from("m1")).unwrap();
        assert_eq!(message.body, "hi Dee\nbye");
        assert_eq!(
            message.markup,
            r#"hi <span class="mention">Dee</span><br>bye"#
        );

        let missing = MessageEdit {
            id: MessageId::from("nope"),
            text: "x".to_string(),
            mentions: Vec::new(),
        };
        assert_eq!(state.apply(&SessionEvent::MessageEdited(missing)), Outcome::Ignored);
    }

    #[test]
    fn test_malformed_mention_spans_do_not_break_the_session() {
        let mut state = session();
        let mut unsorted = created("m1", "p1", "éaéaé");
        unsorted.mentions = vec![Mention::new(3, 2, "me"), Mention::new(0, 1, "p1")];
        assert_eq!(state.apply(&SessionEvent::MessageCreated(unsorted)), Outcome::Applied);

        let mut huge = created("m2", "p1", "hi");
        huge.mentions = vec![Mention::new(1, usize::MAX, "me")];
        assert_eq!(state.apply(&SessionEvent::MessageCreated(huge)), Outcome::Applied);

        let m1 = state.timeline.find_by_id(&MessageId::from("m1")).unwrap();
        assert_eq!(m1.markup, r#"éaé<span class="mention">aé</span>"#);
        let m2 = state.timeline.find_by_id(&MessageId::from("m2")).unwrap();
        assert_eq!(m2.markup, r#"h<span class="mention">i</span>"#);
    }

    #[test]
    fn test_delete_is_final() {
        let mut state = session();
        let mut message = created("m1", "p1", "with file");
        message.attachments = Some(vec![FileData {
            id: AttachmentId::from("a1"),
            name: "doc.pdf".to_string(),
            size: None,
            url: None,
        }]);
        state.apply(&SessionEvent::MessageCreated(message.clone()));
        assert_eq!(
            state.attachments.get(&AttachmentId::from("a1")).unwrap().state,
            AttachmentState::Pending
        );

        let delete = SessionEvent::MessageDeleted(MessageRef {
            id: MessageId::from("m1"),
        });
        assert_eq!(state.apply(&delete), Outcome::Applied);
        assert_eq!(state.apply(&delete), Outcome::Ignored);
        assert!(state.attachments.is_empty());

        // Late events for the deleted message change nothing.
        let before = state.clone();
        state.apply(&SessionEvent::MessageCreated(message));
        state.apply(&SessionEvent::AttachmentReady(ready("a1", "m1")));
        state.apply(&SessionEvent::AttachmentProgress(FileProgress {
            id: AttachmentId::from("a1"),
            owner_message_id: MessageId::from("m1"),
            progress: 50,
        }));
        assert_eq!(state, before);
    }

    #[test]
    fn test_reply_survives_target_deletion() {
        let mut state = session();
        state.apply(&SessionEvent::MessageCreated(created("m1", "p1", "question")));
        let mut reply = created("m2", "p1", "answer");
        reply.reply_id = Some(MessageId::from("m1"));
        state.apply(&SessionEvent::MessageCreated(reply));

        state.apply(&SessionEvent::MessageDeleted(MessageRef {
            id: MessageId::from("m1"),
        }));

        let m2 = state.timeline.find_by_id(&MessageId::from("m2")).unwrap();
        assert_eq!(m2.reply_to, Some(MessageId::from("m1")));
        assert!(state.timeline.reply_target(m2).is_none());
    }

    #[test]
    fn test_upload_progress_then_ready() {
        let mut state = session();
        let (message_id, attachment_id) = local_with_file(&mut state);

        let progress = |p| {
            SessionEvent::AttachmentProgress(FileProgress {
                id: attachment_id.clone(),
                owner_message_id: message_id.clone(),
                progress: p,
            })
        };
        assert_eq!(state.apply(&progress(30)), Outcome::Applied);
        assert_eq!(state.apply(&progress(10)), Outcome::Ignored);

        let mut done = ready(attachment_id.as_str(), message_id.as_str());
        done.size_bytes = None;
        assert_eq!(state.apply(&SessionEvent::AttachmentReady(done)), Outcome::Applied);

        let attachment = state.attachments.get(&attachment_id).unwrap();
        assert!(attachment.url().is_some());
        assert_eq!(attachment.size_bytes, Some(10));
        assert_eq!(state.apply(&progress(90)), Outcome::Ignored);
    }

    #[test]
    fn test_aborted_upload_ignores_late_events() {
        let mut state = session();
        let (message_id, attachment_id) = local_with_file(&mut state);
        state.abort_upload(&attachment_id);

        let progress = SessionEvent::AttachmentProgress(FileProgress {
            id: attachment_id.clone(),
            owner_message_id: message_id.clone(),
            progress: 40,
        });
        assert_eq!(state.apply(&progress), Outcome::Ignored);

        let done = ready(attachment_id.as_str(), message_id.as_str());
        assert_eq!(state.apply(&SessionEvent::AttachmentReady(done)), Outcome::Ignored);
        assert_eq!(
            state.apply(&upload_failed(attachment_id.as_str())),
            Outcome::Ignored
        );
        assert_eq!(
            state.attachments.get(&attachment_id).unwrap().state,
            AttachmentState::Aborted
        );
        assert!(state.timeline.contains(&message_id));
    }

    #[test]
    fn test_foreign_file_materializes_message() {
        let mut state = session();
        assert_eq!(
            state.apply(&SessionEvent::AttachmentReady(ready("a1", "m9"))),
            Outcome::Applied
        );
        assert_eq!(
            state.apply(&SessionEvent::AttachmentReady(ready("a2", "m9"))),
            Outcome::Applied
        );
        assert_eq!(
            state.apply(&SessionEvent::AttachmentReady(ready("a2", "m9"))),
            Outcome::Ignored
        );

        let message = state.timeline.find_by_id(&MessageId::from("m9")).unwrap();
        assert_eq!(message.sent_at, Some(at(5)));
        assert_eq!(
            message.attachment_ids,
            vec![AttachmentId::from("a1"), AttachmentId::from("a2")]
        );
        assert_eq!(
            state.downloadable_files(&MessageId::from("m9")),
            vec![
                ("photo.jpg".to_string(), "https://files/a1".to_string()),
                ("photo.jpg".to_string(), "https://files/a2".to_string()),
            ]
        );
    }

    #[test]
    fn test_upload_failure_rolls_back_unconfirmed_send() {
        let mut state = session();
        let mut remote = created("m1", "p1", "before");
        remote.attachments = Some(vec![FileData {
            id: AttachmentId::from("r1"),
            name: "r.txt".to_string(),
            size: Some(3),
            url: None,
        }]);
        state.apply(&SessionEvent::MessageCreated(remote));
        let (other_id, other_attachment) = local_with_file(&mut state);
        let (message_id, attachment_id) = local_with_file(&mut state);

        let remote_before = state.timeline.find_by_id(&MessageId::from("m1")).cloned();
        let other_before = state.timeline.find_by_id(&other_id).cloned();
        let remote_file_before = state.attachments.get(&AttachmentId::from("r1")).cloned();
        let other_file_before = state.attachments.get(&other_attachment).cloned();

        assert_eq!(state.apply(&upload_failed(attachment_id.as_str())), Outcome::Applied);
        assert!(!state.timeline.contains(&message_id));
        assert!(state.attachments.is_retired(&attachment_id));

        assert_eq!(state.timeline.len(), 2);
        assert_eq!(state.timeline.find_by_id(&MessageId::from("m1")).cloned(), remote_before);
        assert_eq!(state.timeline.find_by_id(&other_id).cloned(), other_before);
        assert_eq!(
            state.attachments.get(&AttachmentId::from("r1")).cloned(),
            remote_file_before
        );
        assert_eq!(state.attachments.get(&other_attachment).cloned(), other_file_before);
    }

    #[test]
    fn test_upload_failure_after_confirmation_keeps_message() {
        let mut state = session();
        let (message_id, attachment_id) = local_with_file(&mut state);
        state.apply(&SessionEvent::MessageCreated(created(message_id.as_str(), "me", "look")));

        assert_eq!(state.apply(&upload_failed(attachment_id.as_str())), Outcome::Applied);
        assert!(state.timeline.contains(&message_id));
        assert_eq!(
            state.attachments.get(&attachment_id).unwrap().state,
            AttachmentState::Failed
        );
    }

    #[test]
    fn test_upload_failure_by_message_id() {
        let mut state = session();
        let outbound = state.append_local(Draft::text("lost")).unwrap();

        assert_eq!(state.apply(&upload_failed("unknown")), Outcome::Ignored);
        assert_eq!(
            state.apply(&upload_failed(outbound.message_id.as_str())),
            Outcome::Applied
        );
        assert!(state.timeline.is_empty());
    }

    #[test]
    fn test_other_transport_errors_are_surfaced() {
        let mut state = session();
        let failure = TransportFailure {
            code: ErrorCode::Other,
            target_id: None,
            message: Some("signaling lost".to_string()),
        };
        let before = state.clone();
        assert_eq!(
            state.apply(&SessionEvent::TransportError(failure.clone())),
            Outcome::Surfaced(failure)
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let mut state = session();
        let before = state.clone();

        let events = [
            SessionEvent::ParticipantLeft(ParticipantRef {
                id: ParticipantId::from("ghost"),
            }),
            SessionEvent::TypingChanged(TypingChange {
                participant_id: ParticipantId::from("ghost"),
                typing: true,
            }),
            SessionEvent::MessageDeleted(MessageRef {
                id: MessageId::from("ghost"),
            }),
            SessionEvent::AttachmentProgress(FileProgress {
                id: AttachmentId::from("ghost"),
                owner_message_id: MessageId::from("ghost"),
                progress: 10,
            }),
            SessionEvent::Unknown,
        ];
        for event in &events {
            assert_eq!(state.apply(event), Outcome::Ignored);
        }
        assert_eq!(state, before);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let mut start = session();
        let (message_id, attachment_id) = local_with_file(&mut start);
        start.apply_ack(&SendAck {
            message_id: message_id.clone(),
            files: Vec::new(),
        });

        let events = vec![
            SessionEvent::ParticipantJoined(info("p2", "Bob")),
            SessionEvent::TypingChanged(TypingChange {
                participant_id: ParticipantId::from("p2"),
                typing: true,
            }),
            SessionEvent::MessageCreated(created("m1", "p2", "hello")),
            SessionEvent::AttachmentReady(ready("a7", "m2")),
            SessionEvent::MessageCreated(created(message_id.as_str(), "me", "look")),
            upload_failed(attachment_id.as_str()),
            SessionEvent::ParticipantLeft(ParticipantRef {
                id: ParticipantId::from("p1"),
            }),
            SessionEvent::MessageDeleted(MessageRef {
                id: MessageId::from("m1"),
            }),
        ];

        let replay = |state: ChatState| {
            events
                .iter()
                .fold(state, |state, event| apply(state, event).0)
        };
        let first = replay(start.clone());
        let second = replay(start);
        assert_eq!(first, second);
        assert_eq!(first.directory.typing_summary(), "Bob is typing...");
    }
}
