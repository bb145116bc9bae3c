//! Entry service exposed to the API layer.
//!
//! Composes the secret store, the codec and a storage engine. Every entry
//! operation takes the caller's secret explicitly; the store is consulted
//! only by [`EntryService::ensure_user_encryption`].

use crate::codec::{open_entry, seal_entry};
use crate::config::EncryptionConfig;
use crate::error::{EntryError, EntryResult};
use crate::identifier::{EntryIdentifier, parse_identifier};
use crate::secret_store::SecretStore;
use crate::storage::EntryStorage;
use crate::types::{EncryptedEntry, EntryUpdate, PlaintextEntry, word_count};
use chrono::Utc;
use journal_crypto::UserSecret;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Encrypted entry CRUD over an [`EntryStorage`].
#[derive(Clone)]
pub struct EntryService {
    storage: Arc<dyn EntryStorage>,
    secrets: SecretStore,
}

impl EntryService {
    pub fn new(storage: Arc<dyn EntryStorage>, secrets: SecretStore) -> Self {
        Self { storage, secrets }
    }

    pub fn with_config(
        storage: Arc<dyn EntryStorage>,
        config: &EncryptionConfig,
    ) -> EntryResult<Self> {
        Ok(Self::new(storage, SecretStore::with_config(config)?))
    }

    pub fn secrets(&self) -> &SecretStore {
        &self.secrets
    }

    /// Returns the user's secret, provisioning one if the user has none.
    pub async fn ensure_user_encryption(&self, user_id: &str) -> UserSecret {
        self.secrets.provision(user_id).await
    }

    /// Encrypts and stores a new entry timestamped now.
    ///
    /// If the user already has an entry for this topic at the same
    /// millisecond, the timestamp is bumped until the sort key is free.
    pub async fn create_entry(
        &self,
        user_id: &str,
        topic_id: &str,
        title: &str,
        content: &str,
        secret: &UserSecret,
    ) -> EntryResult<PlaintextEntry> {
        let now = Utc::now();
        let mut id = EntryIdentifier::new(user_id, topic_id, now.timestamp_millis().max(0) as u64)?;
        while self.storage.get(user_id, &id.sort_key()).await?.is_some() {
            debug!("sort key {} taken, bumping timestamp", id.sort_key());
            id = id.with_timestamp(id.timestamp() + 1);
        }

        let record = seal_entry(&id, secret, title, content, now, now)?;
        self.storage.put(record).await?;
        info!("created encrypted entry {id}");

        Ok(PlaintextEntry {
            user_id: id.user_id().to_string(),
            topic_id: id.topic_id().to_string(),
            id,
            title: title.to_string(),
            content: content.to_string(),
            word_count: word_count(content),
            created_at: now,
            updated_at: now,
        })
    }

    /// `Ok(None)` when no record exists; a record that does not decrypt under
    /// `secret` is an error, not a miss.
    pub async fn get_entry(
        &self,
        composite_id: &str,
        secret: &UserSecret,
    ) -> EntryResult<Option<PlaintextEntry>> {
        let id = parse_identifier(composite_id)?;
        match self.fetch(&id).await? {
            Some(record) => Ok(Some(open_entry(&record, secret)?)),
            None => Ok(None),
        }
    }

    /// Applies `update` and re-encrypts both fields with fresh IVs.
    pub async fn update_entry(
        &self,
        composite_id: &str,
        update: EntryUpdate,
        secret: &UserSecret,
    ) -> EntryResult<Option<PlaintextEntry>> {
        let id = parse_identifier(composite_id)?;
        let Some(record) = self.fetch(&id).await? else {
            return Ok(None);
        };

        let current = open_entry(&record, secret)?;
        let title = update.title.unwrap_or(current.title);
        let content = update.content.unwrap_or(current.content);
        let now = Utc::now();

        let sealed = seal_entry(&id, secret, &title, &content, record.created_at, now)?;
        let word_count = sealed.word_count;
        self.storage.put(sealed).await?;
        info!("updated encrypted entry {id}");

        Ok(Some(PlaintextEntry {
            user_id: id.user_id().to_string(),
            topic_id: id.topic_id().to_string(),
            id,
            title,
            content,
            word_count,
            created_at: record.created_at,
            updated_at: now,
        }))
    }

    /// Returns whether a record was removed.
    pub async fn delete_entry(&self, composite_id: &str) -> EntryResult<bool> {
        let id = parse_identifier(composite_id)?;
        if self.fetch(&id).await?.is_none() {
            return Ok(false);
        }
        self.storage.delete(id.user_id(), &id.sort_key()).await?;
        info!("deleted encrypted entry {id}");
        Ok(true)
    }

    /// Decrypts every entry of the user, newest first. Records that are
    /// malformed or fail to decrypt are logged and skipped.
    pub async fn list_entries(
        &self,
        user_id: &str,
        secret: &UserSecret,
    ) -> EntryResult<Vec<PlaintextEntry>> {
        let records = self.storage.query(user_id).await?;
        Ok(open_all(records, secret))
    }

    /// Like [`list_entries`](Self::list_entries), restricted to one topic.
    pub async fn list_topic_entries(
        &self,
        user_id: &str,
        topic_id: &str,
        secret: &UserSecret,
    ) -> EntryResult<Vec<PlaintextEntry>> {
        let records = self
            .storage
            .query(user_id)
            .await?
            .into_iter()
            .filter(|record| record.topic_id == topic_id)
            .collect();
        Ok(open_all(records, secret))
    }

    async fn fetch(&self, id: &EntryIdentifier) -> EntryResult<Option<EncryptedEntry>> {
        self.storage.get(id.user_id(), &id.sort_key()).await
    }
}

fn open_all(records: Vec<EncryptedEntry>, secret: &UserSecret) -> Vec<PlaintextEntry> {
    let total = records.len();
    let mut entries: Vec<PlaintextEntry> = records
        .iter()
        .filter_map(|record| match open_entry(record, secret) {
            Ok(entry) => Some(entry),
            Err(e) => {
                log_skipped(record, &e);
                None
            }
        })
        .collect();

    if entries.len() < total {
        warn!("skipped {} of {total} unreadable entries", total - entries.len());
    }

    entries.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.timestamp().cmp(&a.id.timestamp()))
    });
    entries
}

fn log_skipped(record: &EncryptedEntry, err: &EntryError) {
    warn!(
        "skipping entry {}/{} ({:?}): {err}",
        record.user_id,
        record.entry_id,
        err.kind()
    );
}
