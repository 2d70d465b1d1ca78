//! Client configuration loaded from environment variables.
//!
//! Every setting has a default, so a client can start with zero
//! configuration.

use parley_engine::MentionMarkers;
use parley_shared::constants::{
    DEFAULT_COMMAND_BUFFER, DEFAULT_DISPLAY_NAME, DEFAULT_EVENT_BUFFER, DEFAULT_MENTION_CLOSE,
    DEFAULT_MENTION_OPEN, MAX_FILE_SIZE,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Name shown to others until the transport confirms our identity.
    /// Env: `PARLEY_DISPLAY_NAME`
    /// Default: `"Guest"`
    pub display_name: String,

    /// Capacity of the command channel to the transport.
    /// Env: `PARLEY_COMMAND_BUFFER`
    /// Default: `64`
    pub command_buffer: usize,

    /// Capacity of the UI event channel.
    /// Env: `PARLEY_EVENT_BUFFER`
    /// Default: `256`
    pub event_buffer: usize,

    /// Largest file accepted for upload, in bytes.
    /// Env: `PARLEY_MAX_FILE_SIZE`
    /// Default: 50 MiB
    pub max_file_size: u64,

    /// Env: `PARLEY_MENTION_OPEN` / `PARLEY_MENTION_CLOSE`
    pub mention_markers: MentionMarkers,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            display_name: DEFAULT_DISPLAY_NAME.to_string(),
            command_buffer: DEFAULT_COMMAND_BUFFER,
            event_buffer: DEFAULT_EVENT_BUFFER,
            max_file_size: MAX_FILE_SIZE,
            mention_markers: MentionMarkers::new(DEFAULT_MENTION_OPEN, DEFAULT_MENTION_CLOSE),
        }
    }
}

impl ClientConfig {
    /// Load configuration from the process environment, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(name) = lookup("PARLEY_DISPLAY_NAME") {
            if !name.trim().is_empty() {
                config.display_name = name;
            }
        }

        if let Some(n) = parse_positive(&lookup, "PARLEY_COMMAND_BUFFER") {
            config.command_buffer = n;
        }

        if let Some(n) = parse_positive(&lookup, "PARLEY_EVENT_BUFFER") {
            config.event_buffer = n;
        }

        if let Some(val) = lookup("PARLEY_MAX_FILE_SIZE") {
            match val.parse::<u64>() {
                Ok(n) => config.max_file_size = n,
                Err(e) => {
                    tracing::warn!(value = %val, error = %e, "Invalid PARLEY_MAX_FILE_SIZE, using default");
                }
            }
        }

        if let Some(open) = lookup("PARLEY_MENTION_OPEN") {
            config.mention_markers.open = open;
        }
        if let Some(close) = lookup("PARLEY_MENTION_CLOSE") {
            config.mention_markers.close = close;
        }

        // RUST_LOG is read by tracing-subscriber's EnvFilter directly.

        config
    }
}

// Channel capacities must be non-zero for tokio's mpsc.
fn parse_positive<F>(lookup: &F, key: &str) -> Option<usize>
where
    F: Fn(&str) -> Option<String>,
{
    let val = lookup(key)?;
    match val.parse::<usize>() {
        Ok(n) if n > 0 => Some(n),
        _ => {
            tracing::warn!(key, value = %val, "Invalid channel capacity, using default");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> ClientConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = config_from(&[]);
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.display_name, "Guest");
        assert_eq!(config.command_buffer, 64);
        assert_eq!(config.max_file_size, 50 * 1024 * 1024);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PARLEY_DISPLAY_NAME", "Ann"),
            ("PARLEY_EVENT_BUFFER", "8"),
            ("PARLEY_MAX_FILE_SIZE", "1024"),
            ("PARLEY_MENTION_OPEN", "<b>"),
            ("PARLEY_MENTION_CLOSE", "</b>"),
        ]);
        assert_eq!(config.display_name, "Ann");
        assert_eq!(config.event_buffer, 8);
        assert_eq!(config.max_file_size, 1024);
        assert_eq!(config.mention_markers, MentionMarkers::new("<b>", "</b>"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("PARLEY_COMMAND_BUFFER", "0"),
            ("PARLEY_EVENT_BUFFER", "lots"),
            ("PARLEY_MAX_FILE_SIZE", "-1"),
            ("PARLEY_DISPLAY_NAME", "  "),
        ]);
        assert_eq!(config, ClientConfig::default());
    }
}
