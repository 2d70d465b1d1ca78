use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use parley_shared::protocol::TransportFailure;

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};

pub const EVENT_SNAPSHOT: &str = "chat-snapshot";
pub const EVENT_TRANSPORT_ERROR: &str = "transport-error";

/// Rendering surface that receives named JSON events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &str, payload: Value) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiEvent {
    pub name: String,
    pub payload: Value,
}

/// Sink that forwards events into a bounded channel. Events are dropped
/// when the receiver lags behind.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<UiEvent>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<UiEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Channel sized by [`ClientConfig::event_buffer`].
    pub fn from_config(config: &ClientConfig) -> (Self, mpsc::Receiver<UiEvent>) {
        Self::new(config.event_buffer)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: &str, payload: Value) -> Result<()> {
        self.tx
            .try_send(UiEvent {
                name: event.to_string(),
                payload,
            })
            .map_err(|e| ClientError::Sink(e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportErrorPayload {
    pub code: String,
    pub target_id: Option<String>,
    pub message: Option<String>,
}

impl From<&TransportFailure> for TransportErrorPayload {
    fn from(failure: &TransportFailure) -> Self {
        Self {
            code: failure.code.to_string(),
            target_id: failure.target_id.clone(),
            message: failure.message.clone(),
        }
    }
}

pub fn emit_event<S: Serialize>(sink: &dyn EventSink, event: &str, payload: S) {
    let result = serde_json::to_value(payload)
        .map_err(|e| ClientError::Sink(e.to_string()))
        .and_then(|value| sink.emit(event, value));
    if let Err(e) = result {
        tracing::error!(event, error = %e, "Failed to emit event");
    }
}
