//! Error types for dskv
//!
//! Provides a unified error type for all operations. "Not found" is not an
//! error here: lookups return `Ok(None)` for absent keys.

use thiserror::Error;

/// Result type alias using DsError
pub type Result<T> = std::result::Result<T, DsError>;

/// Unified error type for dskv operations
#[derive(Debug, Error)]
pub enum DsError {
    // -------------------------------------------------------------------------
    // Engine Errors
    // -------------------------------------------------------------------------
    /// The storage engine reported a failure on a specific call.
    /// Displays the engine's own text verbatim.
    #[error("{0}")]
    Engine(String),

    /// The engine could not be opened at startup. Fatal to initialization.
    #[error("Failed to open storage engine: {0}")]
    Open(String),

    // -------------------------------------------------------------------------
    // Call Errors
    // -------------------------------------------------------------------------
    /// Caller-supplied arguments violate a structural precondition.
    /// Raised before any engine call is made.
    #[error("Malformed call: {0}")]
    MalformedCall(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DsError {
    /// True for failures reported by the engine on a live call
    pub fn is_engine(&self) -> bool {
        matches!(self, DsError::Engine(_))
    }

    /// True when the call was rejected without touching the engine
    pub fn is_malformed(&self) -> bool {
        matches!(self, DsError::MalformedCall(_))
    }
}

impl From<sled::Error> for DsError {
    fn from(err: sled::Error) -> Self {
        DsError::Engine(err.to_string())
    }
}

impl From<serde_json::Error> for DsError {
    fn from(err: serde_json::Error) -> Self {
        DsError::Serialization(err.to_string())
    }
}
