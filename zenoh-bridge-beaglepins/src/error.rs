//! Error types for the bridge.

use thiserror::Error;

/// Result type alias using [`BridgeError`].
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Errors that can stop the bridge or fail a publish.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration file not found.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Configuration parse error.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Configuration validation error.
    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),

    /// Zenoh session could not be opened.
    #[error("Zenoh connection error: {0}")]
    ZenohConnection(String),

    /// Snapshot or status encoding failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The sink rejected a payload.
    #[error("Failed to publish to {key}: {message}")]
    Publish { key: String, message: String },

    /// The sink did not accept a payload in time.
    #[error("Publishing to {key} timed out after {timeout_ms} ms")]
    PublishTimeout { key: String, timeout_ms: u64 },

    /// A scheduler operation was called in the wrong state.
    #[error("Scheduler is {actual}, expected {expected}")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Create a configuration validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ConfigValidation(msg.into())
    }
}

impl From<pinsight_common::Error> for BridgeError {
    fn from(err: pinsight_common::Error) -> Self {
        use pinsight_common::Error as E;
        match err {
            E::Config(msg) => Self::Config(msg),
            E::Zenoh(e) => Self::ZenohConnection(e.to_string()),
            E::ConnectTimeout(ms) => {
                Self::ZenohConnection(format!("session not established within {} ms", ms))
            }
            E::Json(e) => Self::Serialization(e.to_string()),
            E::Cbor(msg) => Self::Serialization(msg),
            E::Io(e) => Self::Io(e),
        }
    }
}

impl From<json5::Error> for BridgeError {
    fn from(err: json5::Error) -> Self {
        Self::ConfigParse(err.to_string())
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// A single board read or line setup that went wrong.
///
/// These never escape the aggregator; they become error markers in the
/// snapshot and a log line.
#[derive(Error, Debug)]
pub enum ReadError {
    /// The identifier does not map to a known header pin or line.
    #[error("{id}: unknown pin")]
    UnknownPin { id: String },

    /// The digital line was never claimed as an input.
    #[error("{id}: line not configured as input")]
    NotClaimed { id: String },

    /// The analog subsystem was not brought up.
    #[error("analog subsystem unavailable: {reason}")]
    AdcUnavailable { reason: String },

    /// An underlying file operation failed.
    #[error("{id}: {op} failed: {source}")]
    Io {
        id: String,
        op: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// The device returned something we could not interpret.
    #[error("{id}: unexpected value {value:?}")]
    Parse { id: String, value: String },
}

impl ReadError {
    pub fn io(id: &str, op: &'static str, source: std::io::Error) -> Self {
        Self::Io {
            id: id.to_string(),
            op,
            source,
        }
    }
}
