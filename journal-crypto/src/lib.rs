//! Encryption primitives for the journal service.
//!
//! Provides per-user field encryption using:
//! - A secret generator minting one opaque secret per user
//! - SHA-256 key derivation over `(user_id, secret, salt)`
//! - AES-256-GCM with 16-byte IVs and detached 16-byte tags
//!
//! # Architecture
//!
//! Keys are never stored. For every entry the key is re-derived from the
//! user's secret and a salt:
//!
//! 1. **Entry salt**: `SHA-256(user_id:secret)`. Deterministic, so the same
//!    user and secret always derive the same entry key.
//!
//! 2. **Stored salt**: every [`EncryptedField`] records the salt its key was
//!    derived under. Decryption reads the stored salt instead of recomputing
//!    it, so records survive a change to the salt formula.
//!
//! The key derivation is a single hash, not an iterated KDF. It exists for
//! compatibility with records already at rest.

mod cipher;
mod error;
mod key;
mod secret;

pub use cipher::{
    EncryptedField, IV_SIZE, TAG_SIZE, decrypt_field, encrypt_field, is_valid_encrypted_data,
    validate_encrypted_field,
};
pub use error::{CryptoError, CryptoResult};
pub use key::{DerivedKey, KEY_SIZE, SALT_SIZE, Salt, derive_entry_key, derive_key, entry_salt};
pub use secret::{
    DEFAULT_ENTROPY_BYTES, MAX_ENTROPY_BYTES, MIN_ENTROPY_BYTES, SecretGenerator, UserSecret,
};
