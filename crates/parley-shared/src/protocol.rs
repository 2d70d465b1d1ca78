use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::{AttachmentId, ErrorCode, Mention, MessageId, ParticipantId};

/// All events emitted by the session transport, in delivery order.
///
/// Serialized as JSON objects with a `type` discriminator. Kinds this
/// version does not know decode to [`SessionEvent::Unknown`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// The transport assigned the local participant's id
    SelfIdentified(ParticipantInfo),

    /// A remote participant joined the meeting
    ParticipantJoined(ParticipantInfo),

    /// A participant left
    ParticipantLeft(ParticipantRef),

    /// Typing indicator changed
    TypingChanged(TypingChange),

    /// New message, or the confirming echo of one of ours
    MessageCreated(NewMessage),

    MessageEdited(MessageEdit),

    MessageDeleted(MessageRef),

    /// Upload progress of a single file
    AttachmentProgress(FileProgress),

    /// A file finished uploading and has a download url
    AttachmentReady(FileReady),

    /// Error reported by the transport's signaling channel
    TransportError(TransportFailure),

    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    pub id: ParticipantId,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantRef {
    pub id: ParticipantId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingChange {
    pub participant_id: ParticipantId,
    pub typing: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMessage {
    pub id: MessageId,
    pub author_id: ParticipantId,
    pub display_name: String,
    pub text: String,
    #[serde(default)]
    pub mentions: Vec<Mention>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_id: Option<MessageId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<FileData>>,
}

/// File metadata carried inside a [`NewMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub id: AttachmentId,
    pub name: String,
    #[serde(default)]
    pub size: Option<u64>,
    /// Absent while the file is still uploading on the sender's side.
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEdit {
    pub id: MessageId,
    pub text: String,
    /// Full replacement of the mention list; offsets refer to `text`.
    #[serde(default)]
    pub mentions: Vec<Mention>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub id: MessageId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileProgress {
    pub id: AttachmentId,
    pub owner_message_id: MessageId,
    /// Percentage; values above 100 are clamped by the engine.
    pub progress: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReady {
    pub id: AttachmentId,
    pub owner_message_id: MessageId,
    pub author_id: ParticipantId,
    pub display_name: String,
    #[serde(default)]
    pub text: String,
    pub sent_at: DateTime<Utc>,
    pub file_name: String,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportFailure {
    pub code: ErrorCode,
    /// Attachment id for upload failures, or the id of a message.
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SessionEvent {
    /// Decode a single JSON event.
    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Short kind label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SelfIdentified(_) => "self-identified",
            Self::ParticipantJoined(_) => "participant-joined",
            Self::ParticipantLeft(_) => "participant-left",
            Self::TypingChanged(_) => "typing-changed",
            Self::MessageCreated(_) => "message-created",
            Self::MessageEdited(_) => "message-edited",
            Self::MessageDeleted(_) => "message-deleted",
            Self::AttachmentProgress(_) => "attachment-progress",
            Self::AttachmentReady(_) => "attachment-ready",
            Self::TransportError(_) => "transport-error",
            Self::Unknown => "unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// Outbound payloads handed to the transport
// ---------------------------------------------------------------------------

/// A file queued for upload alongside a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingFile {
    pub attachment_id: AttachmentId,
    pub file_name: String,
    pub size_bytes: Option<u64>,
    pub path: PathBuf,
}

/// Body of a send-message / send-message-with-files command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub message_id: MessageId,
    pub text: String,
    #[serde(default)]
    pub mentions: Vec<Mention>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_id: Option<MessageId>,
    #[serde(default)]
    pub files: Vec<OutgoingFile>,
}

/// One entry of the upload manifest returned when a send is acknowledged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub id: AttachmentId,
    pub file_name: String,
    #[serde(default)]
    pub size_bytes: Option<u64>,
}

/// Synchronous acknowledgment of a send command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendAck {
    pub message_id: MessageId,
    #[serde(default)]
    pub files: Vec<ManifestEntry>,
}
