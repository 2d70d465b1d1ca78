//! Client state shared between the command handlers and the event bridge.
//!
//! The [`ClientState`] struct is wrapped in `Arc<Mutex<>>`. The lock is only
//! ever held for synchronous engine calls and never across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;

use parley_engine::{ChatSnapshot, ChatState};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::events::{emit_event, EventSink, EVENT_SNAPSHOT};
use crate::transport::TransportCommand;

pub type SharedState = Arc<Mutex<ClientState>>;

pub struct ClientState {
    /// Participants, timeline and uploads.
    pub chat: ChatState,

    /// Sender half of the channel to the transport task.
    /// `None` until [`ClientState::connect`] is called.
    pub command_tx: Option<mpsc::Sender<TransportCommand>>,

    pub config: ClientConfig,

    /// Where snapshots and surfaced errors go.
    pub sink: Arc<dyn EventSink>,
}

impl ClientState {
    pub fn new(config: ClientConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            chat: ChatState::with_markers(config.mention_markers.clone()),
            command_tx: None,
            config,
            sink,
        }
    }

    pub fn shared(config: ClientConfig, sink: Arc<dyn EventSink>) -> SharedState {
        Arc::new(Mutex::new(Self::new(config, sink)))
    }

    /// Transport sender, or [`ClientError::NotConnected`].
    pub fn transport(&self) -> Result<mpsc::Sender<TransportCommand>> {
        self.command_tx.clone().ok_or(ClientError::NotConnected)
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        self.chat.snapshot()
    }

    /// Push the current snapshot to the UI.
    pub fn publish(&self) {
        emit_event(self.sink.as_ref(), EVENT_SNAPSHOT, self.chat.snapshot());
    }
}

pub fn lock(state: &SharedState) -> Result<MutexGuard<'_, ClientState>> {
    state.lock().map_err(|_| ClientError::LockPoisoned)
}

/// Create the command channel, store its sender and announce ourselves.
///
/// Returns the receiving half for the transport task.
pub async fn connect(state: &SharedState) -> Result<mpsc::Receiver<TransportCommand>> {
    let (tx, rx, display_name) = {
        let mut guard = lock(state)?;
        let (tx, rx) = mpsc::channel(guard.config.command_buffer);
        guard.command_tx = Some(tx.clone());
        (tx, rx, guard.config.display_name.clone())
    };

    tracing::info!(name = %display_name, "Joining session");
    crate::transport::dispatch(&tx, TransportCommand::Join { display_name }).await?;
    Ok(rx)
}
