use hiero_core::{CoreError, ErrorKind, TopicId};
use hiero_crypto::CryptoError;

/// Errors raised by the topic feed and the HCS message layer.
#[derive(Debug, thiserror::Error)]
pub enum HcsError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("topic not found: {0}")]
    TopicNotFound(TopicId),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("topic feed error: {0}")]
    Feed(String),

    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("{0}")]
    InvalidMetadata(String),

    #[error("corrupt chunk sequence: {0}")]
    CorruptChunkSequence(String),

    #[error("Resolved HCS file payload is invalid: expected hash {expected}, got {actual}")]
    IntegrityError { expected: String, actual: String },
}

impl HcsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Core(e) => e.kind(),
            Self::Crypto(e) => e.kind(),
            Self::Json(_)
            | Self::InvalidMessage(_)
            | Self::InvalidMetadata(_)
            | Self::CorruptChunkSequence(_) => ErrorKind::MalformedWire,
            Self::TopicNotFound(_) => ErrorKind::NotFound,
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::Feed(_) => ErrorKind::Transient,
            Self::IntegrityError { .. } => ErrorKind::ValidationFailure,
        }
    }
}
