//! Structured logging field name constants for second-brain.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log queries work the same way across the api and db subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), import sessions |
//! | DEBUG | Decision points, computed numbers, config choices |
//! | TRACE | Per-item iteration (chunks, tree walks) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated from the `x-request-id` header.
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "database", "import"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "pool", "cards", "topics", "triage", "pandoc"
pub const COMPONENT: &str = "component";

/// Logical operation name.
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Owning user of the affected rows.
pub const USER_ID: &str = "user_id";

/// Card UUID being operated on.
pub const CARD_ID: &str = "card_id";

/// Topic UUID being operated on.
pub const TOPIC_ID: &str = "topic_id";

/// Hierarchical topic number.
pub const TOPIC_NUMBER: &str = "topic_number";

/// Uploaded file name.
pub const FILENAME: &str = "filename";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of rows returned or affected.
pub const RESULT_COUNT: &str = "result_count";

/// Number of import candidates kept after the cap.
pub const CHUNK_COUNT: &str = "chunk_count";

/// Number of qualifying paragraphs before the cap.
pub const TOTAL_FOUND: &str = "total_found";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

/// Database table or entity affected.
pub const DB_TABLE: &str = "db_table";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ALL: &[&str] = &[
        REQUEST_ID,
        SUBSYSTEM,
        COMPONENT,
        OPERATION,
        USER_ID,
        CARD_ID,
        TOPIC_ID,
        TOPIC_NUMBER,
        FILENAME,
        DURATION_MS,
        RESULT_COUNT,
        CHUNK_COUNT,
        TOTAL_FOUND,
        POOL_SIZE,
        POOL_IDLE,
        DB_TABLE,
        SUCCESS,
        ERROR_MSG,
    ];

    #[test]
    fn test_field_names_are_unique_snake_case() {
        let unique: HashSet<_> = ALL.iter().collect();
        assert_eq!(unique.len(), ALL.len());
        for name in ALL {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "{} is not snake_case",
                name
            );
        }
    }
}
