use hiero_core::ErrorKind;

/// Cryptographic and encoding errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("signature verification failed")]
    SignatureVerificationFailed,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("decoding failed: {0}")]
    Decoding(String),

    #[error("compression failed: {0}")]
    Compression(String),
}

impl CryptoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::SignatureVerificationFailed => ErrorKind::ValidationFailure,
            Self::InvalidKeyLength { .. }
            | Self::InvalidInput(_)
            | Self::Decoding(_)
            | Self::Compression(_) => ErrorKind::MalformedWire,
        }
    }
}
