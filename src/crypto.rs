//! Hashing and key encoding for coil
//!
//! Coil peers identify blocks by a double SHA-256 digest of their canonical
//! textual form. No signature scheme is involved anywhere in the client: wallet
//! keys are forwarded to peers hex-encoded.

use sha2::{Digest, Sha256};

/// SHA-256 applied twice, hex-encoded.
pub fn double_hash(input: &[u8]) -> String {
    let first = Sha256::digest(input);
    hex::encode(Sha256::digest(first))
}

/// Double hash of the UTF-8 bytes of `input`.
pub fn double_hash_str(input: &str) -> String {
    double_hash(input.as_bytes())
}

/// Hex encoding of the UTF-8 bytes of a key string, as peers expect it in
/// transaction payloads.
pub fn encode_key(key: &str) -> String {
    hex::encode(key.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_hash_known_vector() {
        // sha256(sha256(b"hello"))
        assert_eq!(
            double_hash(b"hello"),
            "9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50"
        );
    }

    #[test]
    fn test_double_hash_differs_from_single() {
        let single = hex::encode(Sha256::digest(b"coil"));
        assert_ne!(double_hash(b"coil"), single);
        assert_eq!(double_hash_str("coil"), double_hash(b"coil"));
    }

    #[test]
    fn test_encode_key() {
        assert_eq!(encode_key("abc"), "616263");
        assert_eq!(encode_key(""), "");
    }
}
