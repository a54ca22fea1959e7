//! Cryptographic utilities for webhook signature verification.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use subtle::ConstantTimeEq;

type HmacSha1 = Hmac<Sha1>;

/// Maximum webhook payload size (10MB).
pub const MAX_WEBHOOK_SIZE: usize = 10 * 1024 * 1024;

/// Computes HMAC-SHA1 of data with the given key and returns as hex string.
pub fn hmac_sha1_hex(key: &[u8], data: &[u8]) -> String {
    let mut mac = <HmacSha1 as Mac>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(data);
    let result = mac.finalize();
    hex::encode(result.into_bytes())
}

/// Verifies a Nexus IQ webhook signature using constant-time comparison.
///
/// IQ sends the hex HMAC-SHA1 digest of the raw body, keyed with the secret
/// configured on the webhook, in `X-Nexus-Webhook-Signature`.
pub fn verify_iq_signature(secret: &str, signature: &str, body: &[u8]) -> bool {
    let provided = signature.trim().to_ascii_lowercase();
    let computed = hmac_sha1_hex(secret.as_bytes(), body);

    constant_time_eq(provided.as_bytes(), computed.as_bytes())
}

/// Constant-time equality comparison.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_sha1_known_vector() {
        // RFC 2202 test case 2
        assert_eq!(
            hmac_sha1_hex(b"Jefe", b"what do ya want for nothing?"),
            "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79"
        );
    }

    #[test]
    fn test_iq_signature_verification() {
        let secret = "test-secret";
        let body = b"{\"initiator\":\"admin\"}";
        let signature = hmac_sha1_hex(secret.as_bytes(), body);

        assert!(verify_iq_signature(secret, &signature, body));
        assert!(verify_iq_signature(secret, &signature.to_uppercase(), body));
        assert!(!verify_iq_signature(secret, "invalid", body));
        assert!(!verify_iq_signature("wrong-secret", &signature, body));
        assert!(!verify_iq_signature(secret, &signature, b"tampered"));
    }
}
