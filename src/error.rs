//! Error types for the pNode health engine.
//!
//! Scoring itself never fails on per-node data; the variants here describe
//! upstream conditions (store unreachable, malformed collections, empty
//! history) and configuration problems that callers must be able to tell
//! apart from a legitimate zero score.

use thiserror::Error;

/// Result type alias for health engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the health engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ═══════════════════════════════════════════════════════════════════
    // Data Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Upstream telemetry could not be obtained or was not a collection
    #[error("Telemetry data unavailable: {0}")]
    DataUnavailable(String),

    /// No historical snapshots exist for the requested window
    #[error("No historical data available for {0}")]
    NoHistoricalData(String),

    // ═══════════════════════════════════════════════════════════════════
    // Configuration Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Invalid configuration parameter
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {0}")]
    Config(String),

    // ═══════════════════════════════════════════════════════════════════
    // Serialization Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // ═══════════════════════════════════════════════════════════════════
    // Internal Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Internal error (should not happen in production)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns true if retrying the request later may succeed
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::DataUnavailable(_) | Error::NoHistoricalData(_))
    }

    /// Returns true if the error means "nothing to score yet" rather than a fault
    pub fn is_empty_history(&self) -> bool {
        matches!(self, Error::NoHistoricalData(_))
    }

    /// Returns the error code for external systems
    pub fn code(&self) -> u32 {
        match self {
            // Data errors: 1xxx
            Error::DataUnavailable(_) => 1001,
            Error::NoHistoricalData(_) => 1002,

            // Configuration errors: 2xxx
            Error::InvalidParameter { .. } => 2001,
            Error::Config(_) => 2002,

            // Serialization errors: 7xxx
            Error::Serialization(_) => 7001,
            Error::Deserialization(_) => 7002,

            // Internal errors: 9xxx
            Error::Internal(_) => 9001,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Deserialization(e.to_string())
    }
}
