//! Per-user secrets and the generator that mints them.
//!
//! A secret is the only material that makes a user's entries decryptable.
//! Generated secrets are the lowercase hex SHA-256 of
//! `user_id:unix_millis:hex(random)`, so they are 64 characters long and
//! never reveal the random component.

use crate::error::{CryptoError, CryptoResult};
use chrono::Utc;
use rand::RngCore;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Random bytes mixed into a generated secret by default (256 bits).
pub const DEFAULT_ENTROPY_BYTES: usize = 32;

/// Lower bound on generator entropy (128 bits).
pub const MIN_ENTROPY_BYTES: usize = 16;

/// Upper bound on generator entropy (256 bits).
pub const MAX_ENTROPY_BYTES: usize = 32;

/// Opaque per-user secret. Zeroized on drop, redacted in `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct UserSecret(String);

impl UserSecret {
    /// Wraps existing secret material (e.g. loaded from a durable store).
    pub fn new(secret: impl Into<String>) -> CryptoResult<Self> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(CryptoError::InvalidSecret("secret is empty".to_string()));
        }
        Ok(Self(secret))
    }

    /// Raw secret text. Use only for immediate key derivation; never log it.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for UserSecret {
    /// Constant time in the secret contents; only the length can leak.
    fn eq(&self, other: &Self) -> bool {
        self.0.as_bytes().ct_eq(other.0.as_bytes()).into()
    }
}

impl Eq for UserSecret {}

impl std::fmt::Debug for UserSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("UserSecret").field(&"[REDACTED]").finish()
    }
}

/// Produces fresh, unpredictable secrets.
#[derive(Debug, Clone, Copy)]
pub struct SecretGenerator {
    entropy_bytes: usize,
}

impl SecretGenerator {
    /// Creates a generator mixing `entropy_bytes` of OS randomness into each secret.
    pub fn new(entropy_bytes: usize) -> CryptoResult<Self> {
        if !(MIN_ENTROPY_BYTES..=MAX_ENTROPY_BYTES).contains(&entropy_bytes) {
            return Err(CryptoError::InvalidSecret(format!(
                "entropy must be between {MIN_ENTROPY_BYTES} and {MAX_ENTROPY_BYTES} bytes, got {entropy_bytes}"
            )));
        }
        Ok(Self { entropy_bytes })
    }

    pub fn entropy_bytes(&self) -> usize {
        self.entropy_bytes
    }

    /// Generates a new secret for `user_id`. No side effects; the caller decides
    /// whether to cache or persist it.
    pub fn generate(&self, user_id: &str) -> UserSecret {
        let mut random = [0u8; MAX_ENTROPY_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut random[..self.entropy_bytes]);

        let mut material = format!(
            "{}:{}:{}",
            user_id,
            Utc::now().timestamp_millis(),
            hex::encode(&random[..self.entropy_bytes])
        );
        let digest = Sha256::digest(material.as_bytes());

        material.zeroize();
        random.zeroize();

        UserSecret(hex::encode(digest))
    }
}

impl Default for SecretGenerator {
    fn default() -> Self {
        Self {
            entropy_bytes: DEFAULT_ENTROPY_BYTES,
        }
    }
}
