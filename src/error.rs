//! Error types for the migration pipeline.

/// Top-level error type for the migration tool.
///
/// Rate-limit responses (HTTP 429) never appear here: the executor absorbs
/// them by waiting for the quota reset and retrying. Everything else is
/// fatal for the run and propagates up to the binary, which makes the single
/// exit decision.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Network-level failure (DNS, TLS, connection reset, malformed body).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-recoverable HTTP error from the API (any failure status but 429).
    #[error("API error: HTTP {status} {status_text}\nheaders:\n{headers}\nbody: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Canonical status text.
        status_text: String,
        /// Response headers, one `name: value` per line.
        headers: String,
        /// Response body, drained for diagnostics.
        body: String,
    },

    /// An uploaded attachment could not be matched back to a pending map
    /// entry by name. Distinct from transport errors: the memo body cannot
    /// be safely rewritten, so the run must stop.
    #[error("attachment correlation error: {0}")]
    Correlation(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, MigrationError>;
