//! Entry records: the encrypted form persisted by the storage engine and the
//! plaintext form handed to the API layer.

use crate::error::EntryResult;
use crate::identifier::EntryIdentifier;
use chrono::{DateTime, Utc};
use journal_crypto::EncryptedField;
use serde::{Deserialize, Serialize};

/// Persisted record. Partition key is `user_id`, sort key is `entry_id`
/// (`topic_id-timestamp`). Only `user_id`, `topic_id`, word count and
/// timestamps are visible to the storage layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedEntry {
    pub user_id: String,
    pub entry_id: String,
    pub topic_id: String,
    pub encrypted_title: EncryptedField,
    pub encrypted_content: EncryptedField,
    pub word_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EncryptedEntry {
    /// The externally visible identifier for this record.
    pub fn identifier(&self) -> EntryResult<EntryIdentifier> {
        EntryIdentifier::from_storage_key(&self.user_id, &self.entry_id)
    }
}

/// Decrypted entry as returned to the API layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaintextEntry {
    pub id: EntryIdentifier,
    pub user_id: String,
    pub topic_id: String,
    pub title: String,
    pub content: String,
    pub word_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Partial edit. `None` keeps the current value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

impl EntryUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }
}

/// Number of whitespace-separated words.
pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}
