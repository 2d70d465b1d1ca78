use futures::{Stream, StreamExt};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use parley_engine::Outcome;
use parley_shared::protocol::SessionEvent;

use crate::events::{emit_event, TransportErrorPayload, EVENT_TRANSPORT_ERROR};
use crate::state::{lock, SharedState};

/// Spawn the loop that feeds transport events into the engine.
pub fn spawn_bridge<S>(state: SharedState, events: S) -> JoinHandle<usize>
where
    S: Stream<Item = SessionEvent> + Send + Unpin + 'static,
{
    tokio::spawn(async move { run_bridge(state, events).await })
}

/// Apply every event of the stream in delivery order. Returns the number of
/// events that changed state once the stream ends.
pub async fn run_bridge<S>(state: SharedState, mut events: S) -> usize
where
    S: Stream<Item = SessionEvent> + Unpin,
{
    info!("Session event bridge started");

    let mut applied = 0;
    while let Some(event) = events.next().await {
        if handle_event(&state, &event).changed() {
            applied += 1;
        }
    }

    warn!(applied, "Session event stream ended");
    applied
}

/// Apply one event and notify the UI.
pub fn handle_event(state: &SharedState, event: &SessionEvent) -> Outcome {
    let mut guard = match lock(state) {
        Ok(g) => g,
        Err(e) => {
            error!(error = %e, kind = event.kind(), "Dropping event");
            return Outcome::Ignored;
        }
    };

    let outcome = guard.chat.apply(event);
    match &outcome {
        Outcome::Applied => guard.publish(),
        Outcome::Surfaced(failure) => emit_event(
            guard.sink.as_ref(),
            EVENT_TRANSPORT_ERROR,
            TransportErrorPayload::from(failure),
        ),
        Outcome::Ignored => debug!(kind = event.kind(), "Event changed nothing"),
    }
    outcome
}

/// Decode JSON events, skipping lines that do not parse.
pub fn json_events<S>(lines: S) -> impl Stream<Item = SessionEvent>
where
    S: Stream<Item = String>,
{
    lines.filter_map(|line| async move {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match SessionEvent::from_json(line) {
            Ok(event) => Some(event),
            Err(e) => {
                warn!(error = %e, "Skipping malformed event");
                None
            }
        }
    })
}
