use std::fmt;

use serde::{Deserialize, Serialize};

/// Error taxonomy shared by every resolution and registration operation.
///
/// Each crate-level error enum maps onto one of these kinds, and structured
/// results expose the kind through its wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Missing backing object, topic, or entry.
    #[serde(rename = "notFound")]
    NotFound,
    /// Malformed DID or registry identifier.
    #[serde(rename = "invalidIdentifier")]
    InvalidIdentifier,
    /// Event/id mismatch, bad signature, or integrity hash mismatch.
    #[serde(rename = "validationFailure")]
    ValidationFailure,
    /// Bad JSON or metadata on the wire.
    #[serde(rename = "malformedWire")]
    MalformedWire,
    /// Write rejected by the network.
    #[serde(rename = "permissionDenied")]
    PermissionDenied,
    /// Feed timeout or network error; the caller may retry.
    #[serde(rename = "transient")]
    Transient,
}

impl ErrorKind {
    /// Wire code used in resolution metadata and failure reasons.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "notFound",
            Self::InvalidIdentifier => "invalidIdentifier",
            Self::ValidationFailure => "validationFailure",
            Self::MalformedWire => "malformedWire",
            Self::PermissionDenied => "permissionDenied",
            Self::Transient => "transient",
        }
    }

    /// Whether an operation failing with this kind may succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Core errors: identifier parsing, timestamps, configuration.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid topic ID: {0}")]
    InvalidTopicId(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidTopicId(_) => ErrorKind::InvalidIdentifier,
            Self::InvalidTimestamp(_) | Self::Config(_) => ErrorKind::MalformedWire,
            Self::Io(_) => ErrorKind::Transient,
        }
    }
}
