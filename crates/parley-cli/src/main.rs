//! # parley-replay
//!
//! Replays a JSON-lines session log through the chat engine and prints the
//! resulting timeline.
//!
//! ```text
//! parley-replay <events.jsonl>
//! PARLEY_EVENT_LOG=events.jsonl parley-replay
//! ```

mod replay;

use std::path::PathBuf;

use anyhow::bail;
use tracing::info;

use parley_client::ClientConfig;

const DEFAULT_LOG_DIRECTIVES: &str = "parley_cli=info,parley_client=info,parley_engine=info,warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    parley_client::init_tracing(DEFAULT_LOG_DIRECTIVES);

    let path = match std::env::args().nth(1).or_else(|| std::env::var("PARLEY_EVENT_LOG").ok()) {
        Some(path) => PathBuf::from(path),
        None => bail!("usage: parley-replay <events.jsonl> (or set PARLEY_EVENT_LOG)"),
    };

    let config = ClientConfig::from_env();
    info!(?config, path = %path.display(), "Replaying session log");

    let report = replay::replay(&path, config).await?;
    print!("{}", replay::render_timeline(&report.snapshot));

    info!(
        events = report.events,
        skipped = report.skipped(),
        applied = report.applied,
        "Done"
    );
    Ok(())
}
