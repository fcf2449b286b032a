//! Payload digest.
//!
//! The Bakong backend indexes transactions by the MD5 of the exact payload
//! string, so this digest is what payment status checks are keyed on.

/// Lowercase hex MD5 of `payload`.
pub fn md5_hex(payload: &str) -> String {
    hex::encode(md5::compute(payload.as_bytes()).0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!(md5_hex(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(md5_hex("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_digest_shape() {
        let digest = md5_hex("00020101021229180014your_name@wing");
        assert_eq!(digest.len(), 32);
        assert!(digest.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
    }
}
