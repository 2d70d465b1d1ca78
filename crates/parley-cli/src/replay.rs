//! Replay of a recorded session log.
//!
//! The log holds one JSON event per line, in delivery order. Malformed lines
//! are logged and skipped; the rest go through the same bridge a live client
//! uses.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use futures::{stream, StreamExt};
use serde_json::Value;
use tracing::{debug, info};

use parley_client::bridge::{json_events, run_bridge};
use parley_client::events::EventSink;
use parley_client::state::lock;
use parley_client::{ClientConfig, ClientState};
use parley_engine::{AttachmentState, ChatSnapshot, MessageView};
use parley_shared::protocol::SessionEvent;

/// Sink that only logs what a UI would have received.
struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: &str, _payload: Value) -> parley_client::Result<()> {
        debug!(event, "UI event");
        Ok(())
    }
}

#[derive(Debug)]
pub struct ReplayReport {
    /// Non-blank lines in the log.
    pub lines: usize,
    /// Lines that decoded to an event.
    pub events: usize,
    /// Events that changed state.
    pub applied: usize,
    pub snapshot: ChatSnapshot,
}

impl ReplayReport {
    pub fn skipped(&self) -> usize {
        self.lines - self.events
    }
}

pub async fn replay(path: &Path, config: ClientConfig) -> anyhow::Result<ReplayReport> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read event log {}", path.display()))?;

    let lines: Vec<String> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(str::to_string)
        .collect();
    let line_count = lines.len();

    let events: Vec<SessionEvent> = json_events(stream::iter(lines)).collect().await;
    let event_count = events.len();

    let state = ClientState::shared(config, Arc::new(LogSink));
    let applied = run_bridge(state.clone(), stream::iter(events)).await;

    let snapshot = lock(&state)?.snapshot();

    info!(
        lines = line_count,
        events = event_count,
        applied,
        "Replay finished"
    );

    Ok(ReplayReport {
        lines: line_count,
        events: event_count,
        applied,
        snapshot,
    })
}

/// Plain text rendering of a snapshot, one line per message.
pub fn render_timeline(snapshot: &ChatSnapshot) -> String {
    let mut out = String::new();

    let names: Vec<&str> = snapshot
        .participants
        .iter()
        .map(|p| p.display_name.as_str())
        .collect();
    let _ = writeln!(out, "participants: {}", names.join(", "));

    for message in &snapshot.messages {
        let _ = writeln!(out, "{}", render_message(message));
    }

    if !snapshot.typing.is_empty() {
        let _ = writeln!(out, "{}", snapshot.typing);
    }
    out
}

fn render_message(message: &MessageView) -> String {
    let time = match message.sent_at {
        Some(at) => at.format("%H:%M:%S").to_string(),
        None => "pending".to_string(),
    };
    let mut line = format!("[{time}] {}: {}", message.author_display_name, message.body);

    if let Some(reply) = &message.reply {
        let _ = write!(line, " (reply to {})", reply.author_display_name);
    }
    for attachment in &message.attachments {
        let state = match &attachment.state {
            AttachmentState::Pending => "pending".to_string(),
            AttachmentState::Uploading { progress } => format!("{progress}%"),
            AttachmentState::Ready { .. } => "ready".to_string(),
            AttachmentState::Aborted => "aborted".to_string(),
            AttachmentState::Failed => "failed".to_string(),
        };
        let _ = write!(line, " [{} {state}]", attachment.file_name);
    }
    line
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const LOG: &str = r#"
{"type":"SelfIdentified","id":"me","displayName":"Dee"}
{"type":"ParticipantJoined","id":"p1","displayName":"Ann"}
{"type":"MessageCreated","id":"m1","authorId":"p1","displayName":"Ann","text":"hi @Dee","mentions":[{"offset":3,"length":4,"participantId":"me"}],"sentAt":"2024-05-01T10:00:00Z"}
this line is garbage
{"type":"AttachmentReady","id":"a1","ownerMessageId":"m2","authorId":"p1","displayName":"Ann","sentAt":"2024-05-01T10:01:00Z","fileName":"plan.pdf","sizeBytes":2048,"url":"https://files/a1"}
{"type":"TypingChanged","participantId":"p1","typing":true}
{"type":"ParticipantJoined","id":"p1","displayName":"Ann"}
"#;

    fn log_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_replay_skips_malformed_lines() {
        let file = log_file(LOG);
        let report = replay(file.path(), ClientConfig::default()).await.unwrap();

        assert_eq!(report.lines, 7);
        assert_eq!(report.events, 6);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.applied, 5);
        assert_eq!(report.snapshot.messages.len(), 2);
        assert_eq!(
            report.snapshot.messages[0].markup,
            r#"hi <span class="mention">@Dee</span>"#
        );
    }

    #[tokio::test]
    async fn test_render_timeline() {
        let file = log_file(LOG);
        let report = replay(file.path(), ClientConfig::default()).await.unwrap();
        let text = render_timeline(&report.snapshot);

        assert_eq!(
            text,
            "participants: Dee, Ann\n\
             [10:00:00] Ann: hi @Dee\n\
             [10:01:00] Ann:  [plan.pdf ready]\n\
             Ann is typing...\n"
        );
    }

    #[tokio::test]
    async fn test_missing_log_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = replay(&dir.path().join("absent.jsonl"), ClientConfig::default()).await;
        assert!(result.is_err());
    }
}
