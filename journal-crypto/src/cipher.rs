//! AES-256-GCM field encryption.
//!
//! Each call draws a fresh 16-byte IV. The GCM tag is kept detached from the
//! ciphertext so the stored record carries `encrypted`, `iv`, `tag` and
//! `salt` as separate hex strings.

use crate::error::{CryptoError, CryptoResult};
use crate::key::{DerivedKey, SALT_SIZE, Salt};
use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::AesGcm;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// AES-256-GCM with a 128-bit nonce.
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// IV size in bytes (32 hex chars when stored).
pub const IV_SIZE: usize = 16;

/// GCM authentication tag size in bytes (32 hex chars when stored).
pub const TAG_SIZE: usize = 16;

/// One encrypted field (title or body) as persisted. All members are hex.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedField {
    pub encrypted: String,
    pub iv: String,
    pub tag: String,
    pub salt: String,
}

impl EncryptedField {
    /// The salt this field's key was derived under.
    pub fn salt(&self) -> CryptoResult<Salt> {
        Salt::from_hex(&self.salt)
    }
}

/// Encrypts `plaintext` under `key`, recording the key's salt on the field.
pub fn encrypt_field(key: &DerivedKey, plaintext: &str) -> CryptoResult<EncryptedField> {
    let cipher = Aes256Gcm16::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::Encryption(format!("cipher init: {e}")))?;

    let mut iv = [0u8; IV_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut iv);

    let mut buffer = plaintext.as_bytes().to_vec();
    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(&iv), b"", &mut buffer)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    Ok(EncryptedField {
        encrypted: hex::encode(&buffer),
        iv: hex::encode(iv),
        tag: hex::encode(tag),
        salt: key.salt().to_hex(),
    })
}

/// Decrypts a field under `key`.
///
/// Shape is validated first; a malformed field fails with
/// [`CryptoError::MalformedField`] without touching the cipher. A tag that
/// does not verify fails with [`CryptoError::Decryption`].
pub fn decrypt_field(key: &DerivedKey, field: &EncryptedField) -> CryptoResult<String> {
    validate_encrypted_field(field)?;

    let mut iv = [0u8; IV_SIZE];
    hex::decode_to_slice(&field.iv, &mut iv)
        .map_err(|e| CryptoError::malformed("iv", e.to_string()))?;
    let mut tag = [0u8; TAG_SIZE];
    hex::decode_to_slice(&field.tag, &mut tag)
        .map_err(|e| CryptoError::malformed("tag", e.to_string()))?;
    let mut buffer =
        hex::decode(&field.encrypted).map_err(|e| CryptoError::malformed("encrypted", e.to_string()))?;

    let cipher = Aes256Gcm16::new_from_slice(key.as_bytes())
        .map_err(|e| CryptoError::Decryption(format!("cipher init: {e}")))?;
    cipher
        .decrypt_in_place_detached(
            GenericArray::from_slice(&iv),
            b"",
            &mut buffer,
            GenericArray::from_slice(&tag),
        )
        .map_err(|_| {
            CryptoError::Decryption("authentication failed (wrong key or tampered data)".to_string())
        })?;

    String::from_utf8(buffer).map_err(|e| {
        let mut plaintext = e.into_bytes();
        plaintext.zeroize();
        CryptoError::Decryption("plaintext is not valid UTF-8".to_string())
    })
}

/// Checks the stored shape of a field: `iv` and `tag` are exactly 32 hex
/// chars, `salt` exactly 64, and `encrypted` is valid hex.
pub fn validate_encrypted_field(field: &EncryptedField) -> CryptoResult<()> {
    check_hex("iv", &field.iv, Some(IV_SIZE * 2))?;
    check_hex("tag", &field.tag, Some(TAG_SIZE * 2))?;
    check_hex("salt", &field.salt, Some(SALT_SIZE * 2))?;
    check_hex("encrypted", &field.encrypted, None)?;
    Ok(())
}

/// Boolean form of [`validate_encrypted_field`].
pub fn is_valid_encrypted_data(field: &EncryptedField) -> bool {
    validate_encrypted_field(field).is_ok()
}

fn check_hex(field: &'static str, value: &str, expected_len: Option<usize>) -> CryptoResult<()> {
    match expected_len {
        Some(len) if value.len() != len => {
            return Err(CryptoError::malformed(
                field,
                format!("expected {len} hex chars, got {}", value.len()),
            ));
        }
        None if value.len() % 2 != 0 => {
            return Err(CryptoError::malformed(field, "odd number of hex chars"));
        }
        _ => {}
    }
    if !value.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CryptoError::malformed(field, "non-hex characters"));
    }
    Ok(())
}
