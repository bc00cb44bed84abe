//! Binary snapshot format.
//!
//! Layout: 4 magic bytes, a little-endian u16 format version, then a
//! postcard payload of [`SerializableRegistry`]. Encoding is deterministic:
//! identical registries produce identical bytes.

use crate::{ProductRegistry, RegistryError, SerializableRegistry};

/// Magic bytes at the start of every registry snapshot.
pub const SNAPSHOT_MAGIC: [u8; 4] = *b"CHUR";

/// Current snapshot format version.
pub const SNAPSHOT_FORMAT_VERSION: u16 = 1;

/// Fixed header length: magic + version.
const HEADER_LEN: usize = 6;

/// Encode a registry into snapshot bytes.
pub fn encode_snapshot(registry: &ProductRegistry) -> Result<Vec<u8>, RegistryError> {
    let mut out = Vec::with_capacity(HEADER_LEN);
    out.extend_from_slice(&SNAPSHOT_MAGIC);
    out.extend_from_slice(&SNAPSHOT_FORMAT_VERSION.to_le_bytes());
    let payload = postcard::to_stdvec(&SerializableRegistry::from(registry))?;
    out.extend_from_slice(&payload);
    Ok(out)
}

/// Decode snapshot bytes back into a registry.
///
/// Rejects short input, wrong magic, and unknown format versions with
/// distinct errors so callers can tell corruption from version skew.
pub fn decode_snapshot(data: &[u8]) -> Result<ProductRegistry, RegistryError> {
    if data.len() < HEADER_LEN {
        return Err(RegistryError::TruncatedHeader);
    }
    if data[..4] != SNAPSHOT_MAGIC {
        return Err(RegistryError::BadMagic);
    }
    let version = u16::from_le_bytes([data[4], data[5]]);
    if version != SNAPSHOT_FORMAT_VERSION {
        return Err(RegistryError::UnsupportedFormatVersion(version));
    }
    let serializable: SerializableRegistry = postcard::from_bytes(&data[HEADER_LEN..])?;
    Ok(ProductRegistry::from(serializable))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ProductName, ProductVersion, RegistryStore};
    use std::path::PathBuf;

    fn abs(path: &str) -> PathBuf {
        if cfg!(windows) {
            PathBuf::from(format!("C:{}", path.replace('/', "\\")))
        } else {
            PathBuf::from(path)
        }
    }

    fn sample_registry() -> ProductRegistry {
        let mut registry = ProductRegistry::new();
        registry
            .register(
                ProductName::new("Demo").expect("valid name"),
                ProductVersion::new("1.0").expect("valid version"),
                None,
                abs("/opt/demo/demo"),
            )
            .expect("registration succeeds");
        registry
    }

    #[test]
    fn snapshot_roundtrip() {
        let registry = sample_registry();
        let bytes = encode_snapshot(&registry).expect("encode succeeds");
        let restored = decode_snapshot(&bytes).expect("decode succeeds");

        assert_eq!(restored.product_count(), 1);
        assert_eq!(restored.next_sequence(), registry.next_sequence());
    }

    #[test]
    fn snapshot_is_deterministic() {
        let registry = sample_registry();
        let first = encode_snapshot(&registry).expect("encode succeeds");
        let second = encode_snapshot(&registry).expect("encode succeeds");
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_bad_magic() {
        let registry = sample_registry();
        let mut bytes = encode_snapshot(&registry).expect("encode succeeds");
        bytes[0] = b'X';
        assert!(matches!(
            decode_snapshot(&bytes),
            Err(RegistryError::BadMagic)
        ));
    }

    #[test]
    fn rejects_unknown_version() {
        let registry = sample_registry();
        let mut bytes = encode_snapshot(&registry).expect("encode succeeds");
        bytes[4] = 0xFF;
        bytes[5] = 0xFF;
        assert!(matches!(
            decode_snapshot(&bytes),
            Err(RegistryError::UnsupportedFormatVersion(0xFFFF))
        ));
    }

    #[test]
    fn rejects_truncated_header() {
        assert!(matches!(
            decode_snapshot(b"CHU"),
            Err(RegistryError::TruncatedHeader)
        ));
    }
}
