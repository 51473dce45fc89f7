//! Centralized default constants for second-brain.
//!
//! Organized by domain area. Crates reference these instead of repeating
//! magic numbers.

// =============================================================================
// IMPORT CHUNKING
// =============================================================================

/// Paragraphs shorter than this (in characters, after trimming) are noise.
pub const CHUNK_MIN_CHARS: usize = 20;

/// Maximum number of candidates handed to a triage session.
pub const CHUNK_MAX_CANDIDATES: usize = 500;

/// Maximum characters in a derived candidate title.
pub const TITLE_MAX_CHARS: usize = 80;

// =============================================================================
// TOPICS
// =============================================================================

/// First number handed out at each numeric level.
pub const FIRST_TOPIC_NUMBER: u64 = 1;

/// First letter handed out at each alphabetic level.
pub const FIRST_TOPIC_LETTER: char = 'a';

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP port.
pub const SERVER_PORT: u16 = 3000;

/// Default upload body limit (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Timeout for external document conversion.
pub const CONVERT_TIMEOUT_SECS: u64 = 30;

/// Session lifetime handed out by the session repository.
pub const SESSION_TTL_HOURS: i64 = 24 * 30;

/// Default settings file path.
pub const SETTINGS_PATH: &str = "./settings.json";
