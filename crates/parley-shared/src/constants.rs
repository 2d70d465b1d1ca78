/// Opening marker wrapped around a rendered mention
pub const DEFAULT_MENTION_OPEN: &str = "<span class=\"mention\">";

/// Closing marker wrapped around a rendered mention
pub const DEFAULT_MENTION_CLOSE: &str = "</span>";

/// Line break used when converting message bodies to markup
pub const MARKUP_LINE_BREAK: &str = "<br>";

/// Upper bound of attachment upload progress (percent)
pub const MAX_PROGRESS: u8 = 100;

/// Maximum message body length in characters
pub const MAX_MESSAGE_LENGTH: usize = 4000;

/// Maximum outgoing file size in bytes (50 MiB)
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Typing summary suffixes
pub const TYPING_SINGLE_SUFFIX: &str = "is typing...";
pub const TYPING_PLURAL_SUFFIX: &str = "are typing...";

/// Default display name before the user picks one
pub const DEFAULT_DISPLAY_NAME: &str = "Guest";

/// Default channel capacities between the engine and the transport
pub const DEFAULT_COMMAND_BUFFER: usize = 64;
pub const DEFAULT_EVENT_BUFFER: usize = 256;
