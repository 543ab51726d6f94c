use hiero_core::ErrorKind;
use hiero_crypto::CryptoError;
use hiero_did::DidError;
use hiero_hcs::HcsError;

/// Errors raised while resolving or registering AnonCreds objects.
#[derive(Debug, thiserror::Error)]
pub enum AnonCredsError {
    #[error("{0}")]
    InvalidIdentifier(String),

    #[error("{0} JSON parsing failed: Invalid JSON structure")]
    InvalidJson(&'static str),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Hcs(#[from] HcsError),

    #[error(transparent)]
    Did(#[from] DidError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnonCredsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidIdentifier(_) => ErrorKind::InvalidIdentifier,
            Self::InvalidJson(_) | Self::Json(_) => ErrorKind::MalformedWire,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::ValidationFailure,
            Self::Hcs(e) => e.kind(),
            Self::Did(e) => e.kind(),
            Self::Crypto(e) => e.kind(),
        }
    }

    /// `<code>: <message>`, the reason carried by failed registrations.
    pub fn reason(&self) -> String {
        format!("{}: {}", self.kind().code(), self)
    }
}
