use ed25519_dalek::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use zeroize::Zeroize;

use crate::encoding;
use crate::error::CryptoError;

/// Ed25519 key pair used to sign DID events and topic submissions.
/// Private key material is zeroized on drop by ed25519-dalek.
#[derive(Clone)]
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Generate a new random key pair using OS-provided entropy.
    pub fn generate() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self { signing_key }
    }

    /// Create a key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Create a key pair from raw private key bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut seed = [0u8; 32];
        seed.copy_from_slice(bytes);
        let kp = Self::from_seed(&seed);
        seed.zeroize();
        Ok(kp)
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    /// Raw private key bytes. Prefer `sign()` over exporting.
    pub fn secret_bytes(&self) -> [u8; 32] {
        self.signing_key.to_bytes()
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key().to_bs58())
            .finish_non_exhaustive()
    }
}

/// Ed25519 public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl PublicKey {
    /// Create from raw bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes_arr: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        let verifying_key = VerifyingKey::from_bytes(&bytes_arr)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid public key: {}", e)))?;
        Ok(Self { verifying_key })
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        self.verifying_key.as_bytes()
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// Encode as plain base58 (the `publicKeyBase58` form).
    pub fn to_bs58(&self) -> String {
        encoding::bytes_to_b58(self.as_bytes())
    }

    pub fn from_bs58(bs58_str: &str) -> Result<Self, CryptoError> {
        Self::from_bytes(&encoding::b58_to_bytes(bs58_str)?)
    }

    /// Encode as multibase base58btc (`z` prefix), as embedded in DID identifiers.
    pub fn to_multibase(&self) -> String {
        encoding::multibase_encode(self.as_bytes())
    }

    pub fn from_multibase(value: &str) -> Result<Self, CryptoError> {
        Self::from_bytes(&encoding::multibase_decode(value)?)
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_seed_deterministic() {
        let seed = [42u8; 32];
        let kp1 = KeyPair::from_seed(&seed);
        let kp2 = KeyPair::from_seed(&seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
    }

    #[test]
    fn test_from_bytes_matches_secret() {
        let kp = KeyPair::generate();
        let kp2 = KeyPair::from_bytes(&kp.secret_bytes()).unwrap();
        assert_eq!(kp.public_key(), kp2.public_key());
        assert!(KeyPair::from_bytes(&[0u8; 16]).is_err());
    }

    #[test]
    fn test_public_key_encodings() {
        let pk = KeyPair::from_seed(&[7u8; 32]).public_key();

        let b58 = pk.to_bs58();
        assert_eq!(PublicKey::from_bs58(&b58).unwrap(), pk);

        let mb = pk.to_multibase();
        assert!(mb.starts_with('z'));
        assert_eq!(&mb[1..], b58);
        assert_eq!(PublicKey::from_multibase(&mb).unwrap(), pk);

        assert_eq!(pk.to_hex().len(), 64);
    }

    #[test]
    fn test_public_key_from_bytes_invalid() {
        let err = PublicKey::from_bytes(&[0u8; 31]).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::InvalidKeyLength {
                expected: 32,
                actual: 31
            }
        ));
    }

    #[test]
    fn test_debug_hides_secret() {
        let kp = KeyPair::from_seed(&[1u8; 32]);
        let rendered = format!("{:?}", kp);
        assert!(rendered.contains(&kp.public_key().to_bs58()));
        assert!(!rendered.contains(&hex::encode(kp.secret_bytes())));
    }
}
