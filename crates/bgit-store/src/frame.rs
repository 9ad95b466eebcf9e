//! On-disk object frames.
//!
//! A stored object is `zlib(type SP decimal-length NUL payload)`.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::{StoreError, StoreResult};

/// Frame and compress a typed payload for storage.
pub fn encode_frame(type_name: &str, payload: &[u8]) -> StoreResult<Vec<u8>> {
    let framed = bgit_crypto::frame(type_name, payload);
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&framed)?;
    Ok(encoder.finish()?)
}

/// Decompress and split a stored frame into `(type_name, payload)`.
///
/// Fails with [`StoreError::Malformed`] if the header is incomplete or the
/// declared length differs from the actual payload length.
pub fn decode_frame(bytes: &[u8]) -> StoreResult<(String, Vec<u8>)> {
    let mut raw = Vec::new();
    ZlibDecoder::new(bytes)
        .read_to_end(&mut raw)
        .map_err(|e| StoreError::Malformed(format!("zlib: {e}")))?;

    let space = raw
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| StoreError::Malformed("missing type terminator".into()))?;
    let nul = raw[space..]
        .iter()
        .position(|&b| b == 0)
        .map(|p| p + space)
        .ok_or_else(|| StoreError::Malformed("missing length terminator".into()))?;

    let type_name = std::str::from_utf8(&raw[..space])
        .map_err(|_| StoreError::Malformed("non-ASCII type tag".into()))?
        .to_string();
    let digits = &raw[space + 1..nul];
    let declared: usize = Some(digits)
        .filter(|d| !d.is_empty() && d.iter().all(u8::is_ascii_digit))
        .and_then(|d| std::str::from_utf8(d).ok())
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| StoreError::Malformed("bad length field".into()))?;

    let actual = raw.len() - nul - 1;
    if declared != actual {
        return Err(StoreError::Malformed(format!(
            "bad length: declared {declared}, actual {actual}"
        )));
    }

    raw.drain(..=nul);
    Ok((type_name, raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compress(raw: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(raw).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn encode_then_decode() {
        let encoded = encode_frame("blob", b"hello\n").unwrap();
        let (kind, payload) = decode_frame(&encoded).unwrap();
        assert_eq!(kind, "blob");
        assert_eq!(payload, b"hello\n");
    }

    #[test]
    fn encoded_frame_is_compressed_header_and_payload() {
        let encoded = encode_frame("blob", b"hello\n").unwrap();
        let mut raw = Vec::new();
        ZlibDecoder::new(encoded.as_slice()).read_to_end(&mut raw).unwrap();
        assert_eq!(raw, b"blob 6\x00hello\n");
    }

    #[test]
    fn empty_payload() {
        let (kind, payload) = decode_frame(&encode_frame("tree", b"").unwrap()).unwrap();
        assert_eq!(kind, "tree");
        assert!(payload.is_empty());
    }

    #[test]
    fn length_mismatch_is_malformed() {
        let err = decode_frame(&compress(b"blob 7\x00hello\n")).unwrap_err();
        assert!(matches!(err, StoreError::Malformed(m) if m.contains("declared 7")));
    }

    #[test]
    fn missing_nul_is_malformed() {
        let err = decode_frame(&compress(b"blob 6")).unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }

    #[test]
    fn non_numeric_length_is_malformed() {
        let err = decode_frame(&compress(b"blob six\x00hello\n")).unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }

    #[test]
    fn length_must_be_plain_digits() {
        for raw in [&b"blob +6\x00hello\n"[..], b"blob \x00", b"blob  6\x00hello\n", b"blob -0\x00"] {
            let err = decode_frame(&compress(raw)).unwrap_err();
            assert!(matches!(err, StoreError::Malformed(m) if m == "bad length field"), "{raw:?}");
        }
    }

    #[test]
    fn garbage_input_is_malformed() {
        let err = decode_frame(b"definitely not zlib").unwrap_err();
        assert!(matches!(err, StoreError::Malformed(_)));
    }

    #[test]
    fn payload_may_contain_spaces_and_nuls() {
        let payload = b"a b\x00c d";
        let (_, decoded) = decode_frame(&encode_frame("blob", payload).unwrap()).unwrap();
        assert_eq!(decoded, payload);
    }
}
