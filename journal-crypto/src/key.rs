//! Key derivation from `(user_id, secret, salt)`.
//!
//! The derivation is a single SHA-256 over `user_id:secret:hex(salt)`. This is
//! **not** a password KDF: there is no iteration count and no memory hardness.
//! It is kept byte-compatible with records already at rest. New deployments
//! should seed an HKDF/Argon2 derivation from a securely stored random secret.

use crate::error::{CryptoError, CryptoResult};
use crate::secret::UserSecret;
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// AES-256 key size in bytes.
pub const KEY_SIZE: usize = 32;

/// Salt size in bytes (64 hex chars when stored).
pub const SALT_SIZE: usize = 32;

/// Salt bound into a key derivation. Stored alongside every encrypted field.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Salt([u8; SALT_SIZE]);

impl Salt {
    /// Fresh random salt.
    pub fn random() -> Self {
        let mut bytes = [0u8; SALT_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self(bytes)
    }

    /// Parses a stored salt. Must be exactly 64 hex characters.
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        if s.len() != SALT_SIZE * 2 {
            return Err(CryptoError::malformed(
                "salt",
                format!("expected {} hex chars, got {}", SALT_SIZE * 2, s.len()),
            ));
        }
        let mut bytes = [0u8; SALT_SIZE];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| CryptoError::malformed("salt", e.to_string()))?;
        Ok(Self(bytes))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.0
    }
}

/// A 256-bit symmetric key together with the salt it was derived under.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey {
    key: [u8; KEY_SIZE],
    #[zeroize(skip)]
    salt: Salt,
}

impl DerivedKey {
    /// Wraps raw key bytes. The caller vouches for their provenance.
    pub fn from_bytes(key: [u8; KEY_SIZE], salt: Salt) -> Self {
        Self { key, salt }
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.key
    }

    pub fn salt(&self) -> &Salt {
        &self.salt
    }
}

impl std::fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .field("salt", &self.salt.to_hex())
            .finish()
    }
}

/// Derives a key for `user_id` under `secret`.
///
/// With `salt = None` a random salt is drawn; otherwise the given salt is used
/// as-is. Same inputs always produce the same key.
pub fn derive_key(user_id: &str, secret: &UserSecret, salt: Option<&Salt>) -> DerivedKey {
    let salt = salt.copied().unwrap_or_else(Salt::random);

    let mut material = format!("{}:{}:{}", user_id, secret.expose(), salt.to_hex());
    let digest = Sha256::digest(material.as_bytes());
    material.zeroize();

    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&digest);
    DerivedKey { key, salt }
}

/// Deterministic per-user entry salt: `SHA-256(user_id:secret)`.
pub fn entry_salt(user_id: &str, secret: &UserSecret) -> Salt {
    let mut material = format!("{}:{}", user_id, secret.expose());
    let digest = Sha256::digest(material.as_bytes());
    material.zeroize();

    let mut bytes = [0u8; SALT_SIZE];
    bytes.copy_from_slice(&digest[..SALT_SIZE]);
    Salt(bytes)
}

/// Key used for new entries: [`derive_key`] under [`entry_salt`].
pub fn derive_entry_key(user_id: &str, secret: &UserSecret) -> DerivedKey {
    let salt = entry_salt(user_id, secret);
    derive_key(user_id, secret, Some(&salt))
}
