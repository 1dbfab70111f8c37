//! PKCE (Proof Key for Code Exchange), RFC 7636, S256 method only.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A PKCE code verifier.
///
/// Generated when the login begins and sent to the token endpoint when the
/// authorization code is exchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PkceVerifier(String);

impl PkceVerifier {
    /// Generates a new random verifier (43 base64url characters).
    #[must_use]
    pub fn generate() -> Self {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        // `gen` is a reserved keyword in Rust 2024, so we use r#gen
        let bytes: [u8; 32] = rng.r#gen();
        Self(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Get the verifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for PkceVerifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A PKCE code challenge (S256 digest of a verifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge(String);

impl PkceChallenge {
    /// Derives the S256 challenge from a verifier.
    #[must_use]
    pub fn from_verifier(verifier: &PkceVerifier) -> Self {
        let digest = Sha256::digest(verifier.as_str().as_bytes());
        Self(URL_SAFE_NO_PAD.encode(digest))
    }

    /// Get the challenge as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
