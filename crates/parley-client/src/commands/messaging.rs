use tracing::{info, warn};

use parley_engine::{typing_transition, Draft};
use parley_shared::protocol::{SessionEvent, TransportFailure};
use parley_shared::types::{ErrorCode, Mention, MessageId};

use crate::error::Result;
use crate::state::{lock, SharedState};
use crate::transport::{dispatch, send_with_ack, SendKind, TransportCommand};

/// Optimistically append a draft, hand it to the transport and seed the
/// attachment manifest from the acknowledgment. Every successful send ends
/// with `SetTyping(false)`.
///
/// If the transport cannot be reached the optimistic message is rolled back
/// the same way an upload failure would roll it back.
pub(crate) async fn submit(state: &SharedState, draft: Draft, kind: SendKind) -> Result<MessageId> {
    let (outbound, tx) = {
        let mut guard = lock(state)?;
        let tx = guard.transport()?;
        let outbound = guard.chat.append_local(draft)?;
        guard.publish();
        (outbound, tx)
    };
    let message_id = outbound.message_id.clone();

    let ack = match send_with_ack(&tx, kind, outbound).await {
        Ok(ack) => ack,
        Err(e) => {
            warn!(message_id = %message_id, error = %e, "Send failed, rolling back");
            let mut guard = lock(state)?;
            let rollback = SessionEvent::TransportError(TransportFailure {
                code: ErrorCode::UploadFailed,
                target_id: Some(message_id.to_string()),
                message: Some(e.to_string()),
            });
            if guard.chat.apply(&rollback).changed() {
                guard.publish();
            }
            return Err(e);
        }
    };

    {
        let mut guard = lock(state)?;
        if guard.chat.apply_ack(&ack) {
            guard.publish();
        }
    }

    dispatch(&tx, TransportCommand::SetTyping(false)).await?;

    info!(message_id = %message_id, kind = ?kind, "Message sent");
    Ok(message_id)
}

/// Send a text message.
pub async fn send_message(state: &SharedState, draft: Draft) -> Result<MessageId> {
    submit(state, draft, SendKind::Message).await
}

/// Ask the transport to edit one of our messages. The timeline changes when
/// the transport's `MessageEdited` event comes back.
pub async fn edit_message(
    state: &SharedState,
    id: &MessageId,
    text: String,
    mentions: Vec<Mention>,
) -> Result<MessageId> {
    let (edit, tx) = {
        let guard = lock(state)?;
        let tx = guard.transport()?;
        (guard.chat.prepare_edit(id, text, mentions)?, tx)
    };
    dispatch(&tx, TransportCommand::EditMessage(edit)).await?;
    info!(message_id = %id, "Edit requested");
    Ok(id.clone())
}

pub async fn delete_message(state: &SharedState, id: &MessageId) -> Result<MessageId> {
    let (request, tx) = {
        let guard = lock(state)?;
        let tx = guard.transport()?;
        (guard.chat.prepare_delete(id)?, tx)
    };
    dispatch(&tx, TransportCommand::DeleteMessage(request)).await?;
    info!(message_id = %id, "Delete requested");
    Ok(id.clone())
}

/// Set the local typing flag and tell the transport if it changed.
pub async fn set_typing(state: &SharedState, typing: bool) -> Result<bool> {
    let (changed, tx) = {
        let mut guard = lock(state)?;
        let tx = guard.transport()?;
        let changed = guard.chat.set_local_typing(typing);
        if changed {
            guard.publish();
        }
        (changed, tx)
    };
    if changed {
        dispatch(&tx, TransportCommand::SetTyping(typing)).await?;
    }
    Ok(changed)
}

/// React to a composer content change. Typing signals are only sent when
/// the composer goes from blank to non-blank or back.
pub async fn composer_changed(state: &SharedState, previous: &str, current: &str) -> Result<Option<bool>> {
    match typing_transition(previous, current) {
        Some(typing) => {
            set_typing(state, typing).await?;
            Ok(Some(typing))
        }
        None => Ok(None),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use tokio::sync::mpsc;

    use parley_engine::EngineError;
    use parley_shared::protocol::{ManifestEntry, MessageEdit, ParticipantInfo, SendAck};
    use parley_shared::types::ParticipantId;

    use super::*;
    use crate::config::ClientConfig;
    use crate::error::ClientError;
    use crate::events::{ChannelSink, EventSink};
    use crate::state::{connect, ClientState};

    pub(crate) struct Discard;

    impl EventSink for Discard {
        fn emit(&self, _event: &str, _payload: serde_json::Value) -> crate::error::Result<()> {
            Ok(())
        }
    }

    /// Identified client plus the transport's end of the command channel.
    pub(crate) async fn connected() -> (SharedState, mpsc::Receiver<TransportCommand>) {
        let state = ClientState::shared(ClientConfig::default(), Arc::new(Discard));
        lock(&state).unwrap().chat.apply(&SessionEvent::SelfIdentified(ParticipantInfo {
            id: ParticipantId::from("me"),
            display_name: "Dee".to_string(),
        }));
        let mut rx = connect(&state).await.unwrap();
        assert!(matches!(rx.recv().await, Some(TransportCommand::Join { .. })));
        (state, rx)
    }

    /// Fake transport: acknowledge every send, forward everything else.
    pub(crate) fn fake_transport(
        mut rx: mpsc::Receiver<TransportCommand>,
    ) -> mpsc::UnboundedReceiver<TransportCommand> {
        let (seen_tx, seen_rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    TransportCommand::SendMessage { message, ack }
                    | TransportCommand::SendMessageWithFiles { message, ack }
                    | TransportCommand::SendFile { message, ack } => {
                        let _ = ack.send(SendAck {
                            files: message
                                .files
                                .iter()
                                .map(|f| ManifestEntry {
                                    id: f.attachment_id.clone(),
                                    file_name: f.file_name.clone(),
                                    size_bytes: f.size_bytes,
                                })
                                .collect(),
                            message_id: message.message_id,
                        });
                    }
                    other => {
                        let _ = seen_tx.send(other);
                    }
                }
            }
        });
        seen_rx
    }

    #[tokio::test]
    async fn test_send_without_transport_is_refused() {
        let config = ClientConfig::default();
        let (sink, _rx) = ChannelSink::from_config(&config);
        let state = ClientState::shared(config, Arc::new(sink));
        let result = send_message(&state, Draft::text("hi")).await;
        assert!(matches!(result, Err(ClientError::NotConnected)));
        assert!(lock(&state).unwrap().chat.timeline().is_empty());
    }

    #[tokio::test]
    async fn test_send_appends_and_clears_typing() {
        let (state, rx) = connected().await;
        let mut seen = fake_transport(rx);

        assert_eq!(composer_changed(&state, "", "h").await.unwrap(), Some(true));
        assert_eq!(composer_changed(&state, "h", "hi").await.unwrap(), None);
        assert!(matches!(seen.recv().await, Some(TransportCommand::SetTyping(true))));

        let id = send_message(&state, Draft::text("hi")).await.unwrap();
        assert!(matches!(seen.recv().await, Some(TransportCommand::SetTyping(false))));

        let guard = lock(&state).unwrap();
        let message = guard.chat.timeline().find_by_id(&id).unwrap();
        assert!(message.is_unconfirmed_local());
        assert!(!guard.chat.directory().self_participant().unwrap().is_typing);
    }

    #[tokio::test]
    async fn test_send_clears_typing_even_when_idle() {
        let (state, rx) = connected().await;
        let mut seen = fake_transport(rx);

        send_message(&state, Draft::text("quick")).await.unwrap();
        assert!(matches!(seen.recv().await, Some(TransportCommand::SetTyping(false))));
    }

    #[tokio::test]
    async fn test_local_typing_is_not_in_summary() {
        let (state, rx) = connected().await;
        let mut seen = fake_transport(rx);

        composer_changed(&state, "", "h").await.unwrap();
        assert!(matches!(seen.recv().await, Some(TransportCommand::SetTyping(true))));

        let guard = lock(&state).unwrap();
        assert!(guard.chat.directory().self_participant().unwrap().is_typing);
        assert_eq!(guard.snapshot().typing, "");
    }

    #[tokio::test]
    async fn test_dropped_ack_rolls_back() {
        let (state, mut rx) = connected().await;
        tokio::spawn(async move {
            // Swallow the send without acknowledging it.
            let _ = rx.recv().await;
        });

        let result = send_message(&state, Draft::text("lost")).await;
        assert!(matches!(result, Err(ClientError::AckDropped)));
        assert!(lock(&state).unwrap().chat.timeline().is_empty());
    }

    #[tokio::test]
    async fn test_edit_and_delete_requests() {
        let (state, rx) = connected().await;
        let mut seen = fake_transport(rx);
        let id = send_message(&state, Draft::text("draft")).await.unwrap();
        assert!(matches!(seen.recv().await, Some(TransportCommand::SetTyping(false))));

        edit_message(&state, &id, "final".to_string(), Vec::new())
            .await
            .unwrap();
        match seen.recv().await {
            Some(TransportCommand::EditMessage(MessageEdit { id: edited, text, .. })) => {
                assert_eq!(edited, id);
                assert_eq!(text, "final");
            }
            other => panic!("unexpected command: {other:?}"),
        }

        delete_message(&state, &id).await.unwrap();
        assert!(matches!(seen.recv().await, Some(TransportCommand::DeleteMessage(_))));

        let unknown = MessageId::from("nope");
        assert!(matches!(
            delete_message(&state, &unknown).await,
            Err(ClientError::Engine(EngineError::NotOwnMessage(_)))
        ));
    }
}
