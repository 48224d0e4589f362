// =============================================================================
// SERVER
// =============================================================================

/// Answer stream endpoint used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/chat_stream/";

/// Connect timeout for opening a stream (seconds)
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "ASKSTREAM_BASE_URL";

/// Longest error body kept from a failed response (characters)
pub const MAX_ERROR_BODY_CHARS: usize = 200;

// =============================================================================
// FILES
// =============================================================================

/// Directory for config and logs
pub const STORE_DIR: &str = "./.askstream";

/// Config file name inside STORE_DIR
pub const CONFIG_FILE: &str = "config.yaml";

/// Default log directory
pub const DEFAULT_LOG_DIR: &str = "./.askstream/logs";

/// Log file name inside the log directory
pub const LOG_FILE: &str = "askstream.log";

/// Default tracing filter
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// SESSION
// =============================================================================

/// Session id used on first load
pub const INITIAL_SESSION_ID: &str = "default";

/// Prefix for sessions started with "new chat"
pub const SESSION_PREFIX: &str = "chat_";

// =============================================================================
// EVENT LOOP
// =============================================================================

/// Poll interval for terminal input in milliseconds
pub const EVENT_POLL_MS: u64 = 8;

/// Minimum time between renders (ms) - caps at ~28fps
pub const RENDER_THROTTLE_MS: u64 = 36;

/// Spinner frame interval (ms)
pub const SPINNER_INTERVAL_MS: u64 = 80;

// =============================================================================
// SCROLLING
// =============================================================================

/// Scroll amount for arrow keys
pub const SCROLL_ARROW_AMOUNT: u16 = 1;

/// Scroll amount for PageUp/PageDown
pub const SCROLL_PAGE_AMOUNT: u16 = 10;

// =============================================================================
// UI TEXT
// =============================================================================

/// Default header title
pub const DEFAULT_TITLE: &str = "askstream";

/// Shown in the empty input box
pub const INPUT_PLACEHOLDER: &str = "Ask me anything...";
