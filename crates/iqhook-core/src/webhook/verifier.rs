//! Webhook signature verification.

use crate::crypto::verify_iq_signature;

/// Verifier for `X-Nexus-Webhook-Signature` values.
pub struct SignatureVerifier<'a> {
    secret: &'a str,
}

impl<'a> SignatureVerifier<'a> {
    /// Creates a new verifier with the webhook secret key.
    pub fn new(secret: &'a str) -> Self {
        Self { secret }
    }

    /// Verifies a signature against the raw request body.
    ///
    /// A missing header never verifies.
    pub fn verify(&self, signature: Option<&str>, body: &[u8]) -> bool {
        match signature {
            Some(signature) => verify_iq_signature(self.secret, signature, body),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hmac_sha1_hex;

    #[test]
    fn test_signature_verifier() {
        let secret = "test-secret";
        let body = b"test payload";
        let signature = hmac_sha1_hex(secret.as_bytes(), body);

        let verifier = SignatureVerifier::new(secret);
        assert!(verifier.verify(Some(&signature), body));
        assert!(!verifier.verify(Some("0000"), body));
        assert!(!verifier.verify(None, body));
    }
}
