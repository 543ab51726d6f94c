use sha2::{Digest, Sha256};

/// SHA-256 digest (32 bytes).
pub type Hash = [u8; 32];

pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Lowercase hex SHA-256, as recorded in HCS-1 file metadata.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}
