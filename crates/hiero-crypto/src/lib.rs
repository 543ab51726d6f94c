//! Hiero Crypto: Ed25519 keys and signatures, SHA-256 hashing, the text
//! encodings used on the wire, and zstd compression.

pub mod compression;
pub mod encoding;
pub mod error;
pub mod hashing;
pub mod keys;
pub mod signing;

pub use error::CryptoError;
pub use keys::{KeyPair, PublicKey};
pub use signing::{sign, verify, Signature};
