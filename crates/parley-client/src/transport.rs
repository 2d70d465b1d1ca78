//! Commands sent *to* the session transport.
//!
//! The transport runs as its own task and receives [`TransportCommand`]s
//! over an mpsc channel. Sends carry a oneshot sender through which the
//! transport returns the synchronous acknowledgment with the file manifest;
//! every other command is fire-and-forget.

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use parley_shared::protocol::{MessageEdit, MessageRef, OutboundMessage, SendAck};
use parley_shared::types::AttachmentId;

use crate::error::{ClientError, Result};

#[derive(Debug)]
pub enum TransportCommand {
    /// Announce ourselves to the meeting.
    Join { display_name: String },
    /// Plain text message.
    SendMessage {
        message: OutboundMessage,
        ack: oneshot::Sender<SendAck>,
    },
    /// Message with one or more files to upload.
    SendMessageWithFiles {
        message: OutboundMessage,
        ack: oneshot::Sender<SendAck>,
    },
    /// A single file with an optional caption as the message text.
    SendFile {
        message: OutboundMessage,
        ack: oneshot::Sender<SendAck>,
    },
    /// Cancel an upload. Local state has already moved to Aborted.
    AbortUpload(AttachmentId),
    EditMessage(MessageEdit),
    DeleteMessage(MessageRef),
    SetTyping(bool),
}

impl TransportCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::SendMessage { .. } => "send-message",
            Self::SendMessageWithFiles { .. } => "send-message-with-files",
            Self::SendFile { .. } => "send-file",
            Self::AbortUpload(_) => "abort-upload",
            Self::EditMessage(_) => "edit-message",
            Self::DeleteMessage(_) => "delete-message",
            Self::SetTyping(_) => "set-typing",
        }
    }
}

/// Which send command carries an outbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendKind {
    Message,
    MessageWithFiles,
    File,
}

impl SendKind {
    pub(crate) fn command(self, message: OutboundMessage, ack: oneshot::Sender<SendAck>) -> TransportCommand {
        match self {
            Self::Message => TransportCommand::SendMessage { message, ack },
            Self::MessageWithFiles => TransportCommand::SendMessageWithFiles { message, ack },
            Self::File => TransportCommand::SendFile { message, ack },
        }
    }
}

/// Hand a command to the transport task.
pub async fn dispatch(tx: &mpsc::Sender<TransportCommand>, command: TransportCommand) -> Result<()> {
    let name = command.name();
    tx.send(command)
        .await
        .map_err(|_| ClientError::ChannelClosed)?;
    debug!(command = name, "Command dispatched");
    Ok(())
}

/// Send an outbound message and wait for the transport's acknowledgment.
pub async fn send_with_ack(
    tx: &mpsc::Sender<TransportCommand>,
    kind: SendKind,
    message: OutboundMessage,
) -> Result<SendAck> {
    let (ack_tx, ack_rx) = oneshot::channel();
    dispatch(tx, kind.command(message, ack_tx)).await?;
    ack_rx.await.map_err(|_| ClientError::AckDropped)
}
