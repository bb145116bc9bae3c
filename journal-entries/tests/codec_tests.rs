//! Entry codec properties: round trip, deterministic key with fresh IVs,
//! tamper detection, wrong-secret rejection and malformed-field rejection.

use chrono::Utc;
use journal_crypto::{CryptoError, SecretGenerator, UserSecret, entry_salt};
use journal_entries::codec::{open_entry, seal_entry};
use journal_entries::{
    EntryError, EntryIdentifier, ErrorKind, decrypt_entry, encrypt_entry,
};
use pretty_assertions::assert_eq;

const USER: &str = "34d864b8-40c1-709c-5019-07bba93a5ec5";

fn secret() -> UserSecret {
    SecretGenerator::default().generate(USER)
}

fn flip_first_bit(hex_str: &str) -> String {
    let mut bytes = hex::decode(hex_str).unwrap();
    bytes[0] ^= 0x01;
    hex::encode(bytes)
}

#[test]
fn entry_roundtrip() {
    let s = secret();
    let sealed = encrypt_entry(USER, &s, "Monday", "Walked the dog. Rained.").unwrap();
    let opened = decrypt_entry(USER, &s, &sealed.encrypted_title, &sealed.encrypted_content)
        .unwrap();

    assert_eq!(opened.title, "Monday");
    assert_eq!(opened.content, "Walked the dog. Rained.");
}

#[test]
fn ciphertext_varies_but_salt_is_stable() {
    let s = secret();
    let a = encrypt_entry(USER, &s, "same", "same body").unwrap();
    let b = encrypt_entry(USER, &s, "same", "same body").unwrap();

    assert_ne!(a.encrypted_content.encrypted, b.encrypted_content.encrypted);
    assert_ne!(a.encrypted_content.iv, b.encrypted_content.iv);
    assert_ne!(a.encrypted_content.tag, b.encrypted_content.tag);
    assert_ne!(a.encrypted_title.iv, b.encrypted_title.iv);

    let expected_salt = entry_salt(USER, &s).to_hex();
    assert_eq!(a.encrypted_content.salt, expected_salt);
    assert_eq!(b.encrypted_content.salt, expected_salt);
    assert_eq!(a.encrypted_title.salt, expected_salt);
}

#[test]
fn title_and_content_use_independent_ivs() {
    let s = secret();
    let sealed = encrypt_entry(USER, &s, "t", "c").unwrap();
    assert_ne!(sealed.encrypted_title.iv, sealed.encrypted_content.iv);
}

#[test]
fn wrong_secret_rejected_with_decryption_error() {
    let sealed = encrypt_entry(USER, &secret(), "title", "body").unwrap();
    let err = decrypt_entry(USER, &secret(), &sealed.encrypted_title, &sealed.encrypted_content)
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decryption);
    assert!(!err.is_retryable());
}

#[test]
fn tampered_content_rejected() {
    let s = secret();
    let mut sealed = encrypt_entry(USER, &s, "title", "body").unwrap();
    sealed.encrypted_content.encrypted = flip_first_bit(&sealed.encrypted_content.encrypted);

    let err = decrypt_entry(USER, &s, &sealed.encrypted_title, &sealed.encrypted_content)
        .unwrap_err();
    assert!(matches!(err, EntryError::Crypto(CryptoError::Decryption(_))));
}

#[test]
fn tampered_title_tag_rejected() {
    let s = secret();
    let mut sealed = encrypt_entry(USER, &s, "title", "body").unwrap();
    sealed.encrypted_title.tag = flip_first_bit(&sealed.encrypted_title.tag);

    let err = decrypt_entry(USER, &s, &sealed.encrypted_title, &sealed.encrypted_content)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decryption);
}

#[test]
fn malformed_iv_rejected_before_decryption() {
    let s = secret();
    let mut sealed = encrypt_entry(USER, &s, "title", "body").unwrap();
    sealed.encrypted_title.iv.truncate(30);

    let err = decrypt_entry(USER, &s, &sealed.encrypted_title, &sealed.encrypted_content)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedField);
    assert!(err.is_corrupt_record());
}

#[test]
fn record_roundtrip_keeps_metadata_in_clear() {
    let s = secret();
    let id = EntryIdentifier::new(USER, "daily-reflection", 1756590641205).unwrap();
    let now = Utc::now();

    let record = seal_entry(&id, &s, "Title", "three little words", now, now).unwrap();
    assert_eq!(record.user_id, USER);
    assert_eq!(record.entry_id, "daily-reflection-1756590641205");
    assert_eq!(record.topic_id, "daily-reflection");
    assert_eq!(record.word_count, 3);

    let opened = open_entry(&record, &s).unwrap();
    assert_eq!(opened.id, id);
    assert_eq!(opened.title, "Title");
    assert_eq!(opened.content, "three little words");
    assert_eq!(opened.created_at, now);
}

#[test]
fn persisted_record_shape_is_stable() {
    let s = secret();
    let id = EntryIdentifier::new(USER, "daily", 1).unwrap();
    let now = Utc::now();
    let record = seal_entry(&id, &s, "Groceries", "secret body", now, now).unwrap();

    let json = serde_json::to_value(&record).unwrap();
    for key in [
        "userId",
        "entryId",
        "topicId",
        "encryptedTitle",
        "encryptedContent",
        "wordCount",
        "createdAt",
        "updatedAt",
    ] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    for key in ["encrypted", "iv", "tag", "salt"] {
        assert!(json["encryptedContent"].get(key).is_some(), "missing {key}");
    }

    let raw = json.to_string();
    assert!(!raw.contains("secret body"));
    assert!(!raw.contains("Groceries"));
}

// Property-based tests
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn entry_always_roundtrips(
            secret_text in "[ -~]{1,64}",
            title in ".{0,64}",
            content in ".{0,512}",
        ) {
            let s = UserSecret::new(secret_text).unwrap();
            let sealed = encrypt_entry(USER, &s, &title, &content).unwrap();
            let opened = decrypt_entry(USER, &s, &sealed.encrypted_title, &sealed.encrypted_content)
                .unwrap();
            prop_assert_eq!(opened.title, title);
            prop_assert_eq!(opened.content, content);
        }
    }
}
