use hiero_core::ErrorKind;
use hiero_crypto::CryptoError;
use hiero_hcs::HcsError;

/// Errors raised by the Hedera DID layer.
#[derive(Debug, thiserror::Error)]
pub enum DidError {
    #[error("{0}")]
    InvalidDid(String),

    #[error("{0}")]
    UnknownNetwork(String),

    #[error("{0}")]
    InvalidEvent(String),

    #[error("DID not found: {0}")]
    NotFound(String),

    #[error("external DID document fetch failed: {0}")]
    DocumentFetch(String),

    #[error("{0}")]
    InvalidState(String),

    #[error(transparent)]
    Hcs(#[from] HcsError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DidError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidDid(_) | Self::UnknownNetwork(_) => ErrorKind::InvalidIdentifier,
            Self::InvalidEvent(_) | Self::Json(_) => ErrorKind::MalformedWire,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::DocumentFetch(_) => ErrorKind::Transient,
            Self::InvalidState(_) => ErrorKind::ValidationFailure,
            Self::Hcs(e) => e.kind(),
            Self::Crypto(e) => e.kind(),
        }
    }

    /// Error code reported in DID resolution metadata.
    ///
    /// Identifier failures use the DID resolution codes; everything else
    /// falls back to the shared taxonomy.
    pub fn resolution_code(&self) -> &'static str {
        match self {
            Self::InvalidDid(_) => "invalidDid",
            Self::UnknownNetwork(_) => "unknownNetwork",
            _ => self.kind().code(),
        }
    }
}
