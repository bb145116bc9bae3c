//! Adversarial tests for AES-256-GCM field encryption.
//!
//! Covers wrong-key decryption, ciphertext/tag/IV tampering, truncation,
//! malformed stored shapes and the fresh-IV guarantee.

use journal_crypto::{
    CryptoError, EncryptedField, IV_SIZE, SALT_SIZE, Salt, TAG_SIZE, UserSecret, decrypt_field,
    derive_entry_key, derive_key, encrypt_field, is_valid_encrypted_data,
    validate_encrypted_field,
};

const USER: &str = "34d864b8-40c1-709c-5019-07bba93a5ec5";

fn secret(s: &str) -> UserSecret {
    UserSecret::new(s).unwrap()
}

/// Flips one bit of the byte at `index` inside a hex string.
fn flip_hex_bit(hex_str: &str, index: usize, mask: u8) -> String {
    let mut bytes = hex::decode(hex_str).unwrap();
    bytes[index] ^= mask;
    hex::encode(bytes)
}

// ── Round trip ──

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = derive_entry_key(USER, &secret("correct horse battery staple"));
    let field = encrypt_field(&key, "Dear diary, today was long.").unwrap();
    assert_eq!(decrypt_field(&key, &field).unwrap(), "Dear diary, today was long.");
}

#[test]
fn encrypt_decrypt_empty_plaintext() {
    let key = derive_entry_key(USER, &secret("s3cret"));
    let field = encrypt_field(&key, "").unwrap();
    assert!(field.encrypted.is_empty());
    assert!(is_valid_encrypted_data(&field));
    assert_eq!(decrypt_field(&key, &field).unwrap(), "");
}

#[test]
fn encrypt_decrypt_multibyte_text() {
    let key = derive_entry_key(USER, &secret("s3cret"));
    let text = "日記 — café ☕ 🌙";
    let field = encrypt_field(&key, text).unwrap();
    assert_eq!(decrypt_field(&key, &field).unwrap(), text);
}

#[test]
fn stored_shape_has_exact_hex_lengths() {
    let key = derive_entry_key(USER, &secret("s3cret"));
    let field = encrypt_field(&key, "hello").unwrap();

    assert_eq!(field.iv.len(), IV_SIZE * 2);
    assert_eq!(field.tag.len(), TAG_SIZE * 2);
    assert_eq!(field.salt.len(), SALT_SIZE * 2);
    assert_eq!(field.encrypted.len(), "hello".len() * 2);
    assert_eq!(field.salt, key.salt().to_hex());
}

#[test]
fn each_encryption_uses_fresh_iv() {
    let key = derive_entry_key(USER, &secret("s3cret"));
    let a = encrypt_field(&key, "same text").unwrap();
    let b = encrypt_field(&key, "same text").unwrap();

    assert_ne!(a.iv, b.iv, "IVs must never repeat under one key");
    assert_ne!(a.encrypted, b.encrypted);
    assert_ne!(a.tag, b.tag);
    assert_eq!(a.salt, b.salt);
}

// ── Wrong key ──

#[test]
fn wrong_secret_fails_with_decryption_error() {
    let key = derive_entry_key(USER, &secret("right"));
    let wrong = derive_entry_key(USER, &secret("wrong"));
    let field = encrypt_field(&key, "private").unwrap();

    match decrypt_field(&wrong, &field).unwrap_err() {
        CryptoError::Decryption(msg) => assert!(msg.contains("authentication failed")),
        other => panic!("expected CryptoError::Decryption, got: {other:?}"),
    }
}

#[test]
fn wrong_user_fails() {
    let s = secret("shared-secret");
    let key = derive_entry_key(USER, &s);
    let other = derive_entry_key("00000000-0000-0000-0000-000000000000", &s);
    let field = encrypt_field(&key, "private").unwrap();

    assert!(matches!(
        decrypt_field(&other, &field),
        Err(CryptoError::Decryption(_))
    ));
}

#[test]
fn wrong_salt_fails() {
    let s = secret("s3cret");
    let key = derive_key(USER, &s, Some(&Salt::from_bytes([1; SALT_SIZE])));
    let other = derive_key(USER, &s, Some(&Salt::from_bytes([2; SALT_SIZE])));
    let field = encrypt_field(&key, "private").unwrap();

    assert!(matches!(
        decrypt_field(&other, &field),
        Err(CryptoError::Decryption(_))
    ));
}

// ── Tampering ──

#[test]
fn every_ciphertext_bit_flip_detected() {
    let key = derive_entry_key(USER, &secret("s3cret"));
    let field = encrypt_field(&key, "integrity").unwrap();
    let len = field.encrypted.len() / 2;

    for i in 0..len {
        for mask in [0x01u8, 0x80] {
            let mut tampered = field.clone();
            tampered.encrypted = flip_hex_bit(&field.encrypted, i, mask);
            assert!(
                matches!(decrypt_field(&key, &tampered), Err(CryptoError::Decryption(_))),
                "flip at byte {i} mask {mask:#x} should be detected"
            );
        }
    }
}

#[test]
fn every_tag_bit_flip_detected() {
    let key = derive_entry_key(USER, &secret("s3cret"));
    let field = encrypt_field(&key, "integrity").unwrap();

    for i in 0..TAG_SIZE {
        let mut tampered = field.clone();
        tampered.tag = flip_hex_bit(&field.tag, i, 0x01);
        assert!(
            matches!(decrypt_field(&key, &tampered), Err(CryptoError::Decryption(_))),
            "tag flip at byte {i} should be detected"
        );
    }
}

#[test]
fn iv_tampering_detected() {
    let key = derive_entry_key(USER, &secret("s3cret"));
    let mut field = encrypt_field(&key, "integrity").unwrap();
    field.iv = flip_hex_bit(&field.iv, 0, 0xFF);

    assert!(matches!(
        decrypt_field(&key, &field),
        Err(CryptoError::Decryption(_))
    ));
}

#[test]
fn truncated_ciphertext_fails() {
    let key = derive_entry_key(USER, &secret("s3cret"));
    let mut field = encrypt_field(&key, "data that will be truncated").unwrap();
    field.encrypted.truncate(10);

    assert!(matches!(
        decrypt_field(&key, &field),
        Err(CryptoError::Decryption(_))
    ));
}

#[test]
fn swapped_ciphertexts_not_interchangeable() {
    let key = derive_entry_key(USER, &secret("s3cret"));
    let a = encrypt_field(&key, "message A").unwrap();
    let b = encrypt_field(&key, "message B").unwrap();

    let franken = EncryptedField {
        encrypted: b.encrypted.clone(),
        ..a.clone()
    };
    assert!(decrypt_field(&key, &franken).is_err());
}

// ── Malformed shapes ──

#[test]
fn thirty_char_iv_rejected_before_decryption() {
    let key = derive_entry_key(USER, &secret("s3cret"));
    let mut field = encrypt_field(&key, "hello").unwrap();
    field.iv.truncate(30);

    assert!(!is_valid_encrypted_data(&field));
    match decrypt_field(&key, &field).unwrap_err() {
        CryptoError::MalformedField { field, reason } => {
            assert_eq!(field, "iv");
            assert!(reason.contains("expected 32"), "got: {reason}");
        }
        other => panic!("expected MalformedField, got: {other:?}"),
    }
}

#[test]
fn short_tag_rejected() {
    let key = derive_entry_key(USER, &secret("s3cret"));
    let mut field = encrypt_field(&key, "hello").unwrap();
    field.tag.pop();

    assert!(matches!(
        validate_encrypted_field(&field),
        Err(CryptoError::MalformedField { field: "tag", .. })
    ));
}

#[test]
fn long_salt_rejected() {
    let key = derive_entry_key(USER, &secret("s3cret"));
    let mut field = encrypt_field(&key, "hello").unwrap();
    field.salt.push_str("00");

    assert!(matches!(
        validate_encrypted_field(&field),
        Err(CryptoError::MalformedField { field: "salt", .. })
    ));
}

#[test]
fn non_hex_iv_rejected() {
    let key = derive_entry_key(USER, &secret("s3cret"));
    let mut field = encrypt_field(&key, "hello").unwrap();
    field.iv = "g".repeat(IV_SIZE * 2);

    assert!(matches!(
        validate_encrypted_field(&field),
        Err(CryptoError::MalformedField { field: "iv", .. })
    ));
}

// ── Serialization ──

#[test]
fn field_serializes_with_persisted_names() {
    let key = derive_entry_key(USER, &secret("s3cret"));
    let field = encrypt_field(&key, "hello").unwrap();
    let json = serde_json::to_value(&field).unwrap();

    for name in ["encrypted", "iv", "tag", "salt"] {
        assert!(json.get(name).is_some(), "missing {name}");
    }

    let back: EncryptedField = serde_json::from_value(json).unwrap();
    assert_eq!(decrypt_field(&key, &back).unwrap(), "hello");
}

// Property-based tests
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn field_always_roundtrips(text in ".*", secret_text in "[a-f0-9]{8,64}") {
            let key = derive_entry_key(USER, &secret(&secret_text));
            let field = encrypt_field(&key, &text).unwrap();
            prop_assert!(is_valid_encrypted_data(&field));
            prop_assert_eq!(decrypt_field(&key, &field).unwrap(), text);
        }
    }
}
