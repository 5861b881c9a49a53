use thiserror::Error;

// ---------------------------------------------------------------------------
// StoreError
// ---------------------------------------------------------------------------

/// Errors raised by the typed conversion helpers.
///
/// The store operations themselves (`set_state`, `select`, cache reads and
/// writes, `destroy`) never fail; only converting between typed Rust values
/// and JSON records can.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Expected a JSON object for a record, received {found}")]
    NotARecord { found: &'static str },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Convenience alias — the default error type is `StoreError`.
pub type Result<T, E = StoreError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
