//! Key-value storage seam for encrypted entries.
//!
//! The storage engine only ever sees [`EncryptedEntry`] records, addressed by
//! partition key (`user_id`) and sort key (`topic_id-timestamp`).

use crate::error::EntryResult;
use crate::types::EncryptedEntry;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// Partition/sort-key store for encrypted records.
#[async_trait]
pub trait EntryStorage: Send + Sync {
    async fn get(&self, user_id: &str, sort_key: &str) -> EntryResult<Option<EncryptedEntry>>;

    /// Inserts or replaces the record at `(entry.user_id, entry.entry_id)`.
    async fn put(&self, entry: EncryptedEntry) -> EntryResult<()>;

    /// All records in the user's partition, in sort-key order.
    async fn query(&self, user_id: &str) -> EntryResult<Vec<EncryptedEntry>>;

    /// Removes the record if present. Deleting a missing key is not an error.
    async fn delete(&self, user_id: &str, sort_key: &str) -> EntryResult<()>;
}

/// In-process storage engine for tests and single-node use.
#[derive(Default)]
pub struct MemoryEntryStorage {
    records: RwLock<BTreeMap<(String, String), EncryptedEntry>>,
}

impl MemoryEntryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl EntryStorage for MemoryEntryStorage {
    async fn get(&self, user_id: &str, sort_key: &str) -> EntryResult<Option<EncryptedEntry>> {
        let records = self.records.read().await;
        Ok(records
            .get(&(user_id.to_string(), sort_key.to_string()))
            .cloned())
    }

    async fn put(&self, entry: EncryptedEntry) -> EntryResult<()> {
        let key = (entry.user_id.clone(), entry.entry_id.clone());
        self.records.write().await.insert(key, entry);
        Ok(())
    }

    async fn query(&self, user_id: &str) -> EntryResult<Vec<EncryptedEntry>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .filter(|((partition, _), _)| partition == user_id)
            .map(|(_, entry)| entry.clone())
            .collect())
    }

    async fn delete(&self, user_id: &str, sort_key: &str) -> EntryResult<()> {
        self.records
            .write()
            .await
            .remove(&(user_id.to_string(), sort_key.to_string()));
        Ok(())
    }
}
