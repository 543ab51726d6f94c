use std::fmt;
use std::str::FromStr;

use hiero_crypto::{compression, encoding, hashing};

use crate::error::HcsError;
use crate::file::chunk::HcsFileChunkMessage;

/// Data URI prefix carried by chunk 0.
pub const DATA_URI_PREFIX: &str = "data:application/json;base64,";

pub const ENCODING_BASE64: &str = "base64";

/// The `<sha256-hex>:<compression>:<encoding>` triple stored as the topic memo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub sha256_hex: String,
    pub compression: String,
    pub encoding: String,
}

impl FileMetadata {
    pub fn for_payload(payload: &[u8]) -> Self {
        Self {
            sha256_hex: hashing::sha256_hex(payload),
            compression: compression::ZSTD.to_string(),
            encoding: ENCODING_BASE64.to_string(),
        }
    }

    /// Whether `payload` hashes to the recorded digest.
    pub fn matches(&self, payload: &[u8]) -> bool {
        hashing::sha256_hex(payload) == self.sha256_hex
    }
}

impl FromStr for FileMetadata {
    type Err = HcsError;

    fn from_str(memo: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = memo.split(':').collect();
        let [hash, algorithm, text_encoding] = parts.as_slice() else {
            return Err(HcsError::InvalidMetadata(format!(
                "expected '<sha256>:<compression>:<encoding>', got '{}'",
                memo
            )));
        };

        let is_hex_digest = hash.len() == 64 && hash.bytes().all(|b| b.is_ascii_hexdigit());
        if !is_hex_digest {
            return Err(HcsError::InvalidMetadata(format!(
                "invalid SHA-256 digest '{}'",
                hash
            )));
        }
        if *algorithm != compression::ZSTD {
            return Err(HcsError::InvalidMetadata(format!(
                "unsupported compression '{}'",
                algorithm
            )));
        }
        if *text_encoding != ENCODING_BASE64 {
            return Err(HcsError::InvalidMetadata(format!(
                "unsupported encoding '{}'",
                text_encoding
            )));
        }

        Ok(Self {
            sha256_hex: hash.to_ascii_lowercase(),
            compression: algorithm.to_string(),
            encoding: text_encoding.to_string(),
        })
    }
}

impl fmt::Display for FileMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.sha256_hex, self.compression, self.encoding)
    }
}

/// Compress, encode and split a payload into chunks of at most `max_chunk_size` bytes.
pub fn get_file_chunk_messages(
    payload: &[u8],
    max_chunk_size: usize,
) -> Result<Vec<HcsFileChunkMessage>, HcsError> {
    if max_chunk_size == 0 {
        return Err(HcsError::InvalidMessage("chunk size must be positive".into()));
    }
    let compressed = compression::compress(payload)?;
    let content = format!("{}{}", DATA_URI_PREFIX, encoding::bytes_to_b64(&compressed));

    // The content is pure ASCII, so byte chunks are valid UTF-8.
    Ok(content
        .as_bytes()
        .chunks(max_chunk_size)
        .enumerate()
        .map(|(index, piece)| {
            HcsFileChunkMessage::new(index as i64, String::from_utf8_lossy(piece).into_owned())
        })
        .collect())
}

/// Reassemble a payload from chunk messages in any order.
///
/// Indices must form an exact permutation of `0..N-1`; a gap, duplicate or
/// out-of-range index is rejected.
pub fn build_file_from_chunk_messages(
    chunks: &[HcsFileChunkMessage],
) -> Result<Vec<u8>, HcsError> {
    let ordered = order_chunks(chunks)?;

    let mut content = String::with_capacity(ordered.iter().map(|c| c.content.len()).sum());
    for chunk in ordered {
        content.push_str(&chunk.content);
    }
    let encoded = content.strip_prefix(DATA_URI_PREFIX).unwrap_or(&content);

    let decode = || -> Result<Vec<u8>, hiero_crypto::CryptoError> {
        compression::decompress(&encoding::b64_to_bytes(encoded)?)
    };
    decode().map_err(|e| {
        HcsError::InvalidMessage(format!(
            "Error on building HCS-1 file payload from chunk messages: {}",
            e
        ))
    })
}

fn order_chunks(chunks: &[HcsFileChunkMessage]) -> Result<Vec<&HcsFileChunkMessage>, HcsError> {
    let total = chunks.len();
    if total == 0 {
        return Err(HcsError::CorruptChunkSequence("no chunks".into()));
    }

    let mut slots: Vec<Option<&HcsFileChunkMessage>> = vec![None; total];
    for chunk in chunks {
        let index = usize::try_from(chunk.ordering_index)
            .ok()
            .filter(|i| *i < total)
            .ok_or_else(|| {
                HcsError::CorruptChunkSequence(format!(
                    "index {} out of range for {} chunks",
                    chunk.ordering_index, total
                ))
            })?;
        if slots[index].replace(chunk).is_some() {
            return Err(HcsError::CorruptChunkSequence(format!(
                "duplicate chunk index {}",
                index
            )));
        }
    }

    // N in-range, distinct indices over N slots leave no gaps.
    Ok(slots.into_iter().flatten().collect())
}
