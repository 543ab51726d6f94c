use crate::error::CryptoError;

/// Algorithm name recorded alongside compressed payloads.
pub const ZSTD: &str = "zstd";

const LEVEL: i32 = 3;

pub fn compress(data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    zstd::encode_all(data, LEVEL).map_err(|e| CryptoError::Compression(e.to_string()))
}

pub fn decompress(data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    zstd::decode_all(data).map_err(|e| CryptoError::Compression(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_decompress() {
        let data = br#"{"attrNames":["name","age"],"name":"schema"}"#.repeat(20);
        let compressed = compress(&data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(decompress(&compressed).unwrap(), data);
    }

    #[test]
    fn test_decompress_garbage_fails() {
        assert!(decompress(b"definitely not zstd").is_err());
    }
}
