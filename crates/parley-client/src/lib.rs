//! # parley-client
//!
//! Async adapter around `parley-engine`: owns the shared client state, drives
//! the reducer from the transport's event stream and forwards local commands
//! to the transport task.

pub mod bridge;
pub mod commands;
pub mod config;
pub mod events;
pub mod state;
pub mod transport;

mod error;

use tracing_subscriber::{fmt, EnvFilter};

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use state::{ClientState, SharedState};

/// Default filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_DIRECTIVES: &str = "parley_client=debug,parley_engine=info,warn";

/// Install the global tracing subscriber, writing to stderr. `RUST_LOG`
/// wins over `default_directives`.
pub fn init_tracing(default_directives: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}
