use base64::{engine::general_purpose::STANDARD, Engine};
use md5::{Digest, Md5};
use subtle::ConstantTimeEq;

/// Base64 encode bytes (standard alphabet, padded).
pub fn base64_encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// MD5 digest of `data` as 32 lowercase hex characters.
pub fn md5_hex(data: &[u8]) -> String {
    hex::encode(Md5::digest(data))
}

/// Signature token for a signing payload: `hex(md5(base64(payload)))`.
pub fn sign_payload(payload: &str) -> String {
    md5_hex(base64_encode(payload.as_bytes()).as_bytes())
}

/// Constant-time string comparison. Length is not hidden.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    a.len() == b.len() && bool::from(a.as_bytes().ct_eq(b.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base64_is_padded_standard() {
        assert_eq!(base64_encode(b"ab"), "YWI=");
        assert_eq!(base64_encode(&[0xfb, 0xff]), "+/8=");
        assert_eq!(base64_encode(b""), "");
    }

    #[test]
    fn md5_known_vectors() {
        assert_eq!(md5_hex(b""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(
            md5_hex(b"com.madao.NDAuthLoginDemo"),
            "bf5b19ccbb731fdfd427bf09e7cb5256"
        );
    }

    #[test]
    fn md5_hex_is_32_lowercase_chars() {
        let digest = md5_hex(b"anything");
        assert_eq!(digest.len(), 32);
        assert!(digest
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn sign_payload_hashes_the_base64_text() {
        let payload = "errCode=-1&onceCode=abc&timestamp=1597045&type=1000";
        assert_eq!(
            base64_encode(payload.as_bytes()),
            "ZXJyQ29kZT0tMSZvbmNlQ29kZT1hYmMmdGltZXN0YW1wPTE1OTcwNDUmdHlwZT0xMDAw"
        );
        assert_eq!(sign_payload(payload), "9c75b7f2b7ee597f9bf20cf7675ec11d");
    }

    #[test]
    fn constant_time_eq_cases() {
        assert!(constant_time_eq("abc", "abc"));
        assert!(!constant_time_eq("abc", "abd"));
        assert!(!constant_time_eq("abc", "ABC"));
        assert!(!constant_time_eq("abc", "abcd"));
        assert!(constant_time_eq("", ""));
    }
}
