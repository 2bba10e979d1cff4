//! Admin credential verification.
//!
//! Every write endpoint and the image upload host check the `x-admin-key`
//! credential through a [`CredentialVerifier`]. The shipped implementation
//! compares HMAC-SHA256 digests of the presented and configured secrets in
//! constant time.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Decides whether a presented credential grants admin access.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> bool;
}

/// Verifies credentials against a single shared secret.
pub struct SharedSecretVerifier {
    key: SecretString,
    expected: Vec<u8>,
}

impl std::fmt::Debug for SharedSecretVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecretVerifier").finish_non_exhaustive()
    }
}

impl SharedSecretVerifier {
    /// Create a verifier for `secret`.
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        let expected = digest(&secret, secret.expose_secret()).unwrap_or_default();
        Self {
            key: secret,
            expected,
        }
    }
}

fn digest(key: &SecretString, message: &str) -> Option<Vec<u8>> {
    let mut mac = HmacSha256::new_from_slice(key.expose_secret().as_bytes()).ok()?;
    mac.update(message.as_bytes());
    Some(mac.finalize().into_bytes().to_vec())
}

impl CredentialVerifier for SharedSecretVerifier {
    fn verify(&self, credential: &str) -> bool {
        if credential.is_empty() || self.expected.is_empty() {
            return false;
        }

        let Ok(mut mac) = HmacSha256::new_from_slice(self.key.expose_secret().as_bytes()) else {
            return false;
        };
        mac.update(credential.as_bytes());
        // verify_slice compares in constant time
        mac.verify_slice(&self.expected).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> SharedSecretVerifier {
        SharedSecretVerifier::new(SecretString::from("k7Qz!p2Lw9#Rx4Vm"))
    }

    #[test]
    fn test_accepts_configured_secret() {
        assert!(verifier().verify("k7Qz!p2Lw9#Rx4Vm"));
    }

    #[test]
    fn test_rejects_empty_and_wrong() {
        let verifier = verifier();
        assert!(!verifier.verify(""));
        assert!(!verifier.verify("k7Qz!p2Lw9#Rx4V"));
        assert!(!verifier.verify("k7Qz!p2Lw9#Rx4Vm "));
        assert!(!verifier.verify("Teslix9999"));
    }

    #[test]
    fn test_debug_hides_secret() {
        assert!(!format!("{:?}", verifier()).contains("k7Qz"));
    }
}
