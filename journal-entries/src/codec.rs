//! Maps plaintext entries to and from their encrypted storage form.
//!
//! Encryption derives one key per `(user_id, secret)` using the deterministic
//! entry salt and seals title and content independently under it (two IVs,
//! two tags). Decryption derives the key from the salt stored on
//! `encrypted_content`, never from the current salt formula.

use crate::error::EntryResult;
use crate::identifier::EntryIdentifier;
use crate::types::{EncryptedEntry, PlaintextEntry, word_count};
use chrono::{DateTime, Utc};
use journal_crypto::{
    EncryptedField, UserSecret, decrypt_field, derive_entry_key, derive_key, encrypt_field,
    validate_encrypted_field,
};

/// Title and content sealed under one key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedFields {
    pub encrypted_title: EncryptedField,
    pub encrypted_content: EncryptedField,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecryptedFields {
    pub title: String,
    pub content: String,
}

pub fn encrypt_entry(
    user_id: &str,
    secret: &UserSecret,
    title: &str,
    content: &str,
) -> EntryResult<EncryptedFields> {
    let key = derive_entry_key(user_id, secret);
    Ok(EncryptedFields {
        encrypted_title: encrypt_field(&key, title)?,
        encrypted_content: encrypt_field(&key, content)?,
    })
}

pub fn decrypt_entry(
    user_id: &str,
    secret: &UserSecret,
    encrypted_title: &EncryptedField,
    encrypted_content: &EncryptedField,
) -> EntryResult<DecryptedFields> {
    validate_encrypted_field(encrypted_title)?;
    validate_encrypted_field(encrypted_content)?;

    let salt = encrypted_content.salt()?;
    let key = derive_key(user_id, secret, Some(&salt));
    Ok(DecryptedFields {
        title: decrypt_field(&key, encrypted_title)?,
        content: decrypt_field(&key, encrypted_content)?,
    })
}

/// Builds the persisted record for `id`.
pub fn seal_entry(
    id: &EntryIdentifier,
    secret: &UserSecret,
    title: &str,
    content: &str,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> EntryResult<EncryptedEntry> {
    let fields = encrypt_entry(id.user_id(), secret, title, content)?;
    Ok(EncryptedEntry {
        user_id: id.user_id().to_string(),
        entry_id: id.sort_key(),
        topic_id: id.topic_id().to_string(),
        encrypted_title: fields.encrypted_title,
        encrypted_content: fields.encrypted_content,
        word_count: word_count(content),
        created_at,
        updated_at,
    })
}

/// Decrypts a persisted record.
pub fn open_entry(record: &EncryptedEntry, secret: &UserSecret) -> EntryResult<PlaintextEntry> {
    let id = record.identifier()?;
    let fields = decrypt_entry(
        &record.user_id,
        secret,
        &record.encrypted_title,
        &record.encrypted_content,
    )?;
    Ok(PlaintextEntry {
        id,
        user_id: record.user_id.clone(),
        topic_id: record.topic_id.clone(),
        title: fields.title,
        content: fields.content,
        word_count: record.word_count,
        created_at: record.created_at,
        updated_at: record.updated_at,
    })
}
