//! Thread-safe, process-local store of per-user secrets.
//!
//! The store is the only authority for "does this user have encryption
//! enabled". Nothing here is persisted: a restart forgets every secret, and
//! under [`SecretPolicy::GenerateOnMiss`] the next access mints a different
//! one, orphaning that user's existing records. Deployments holding real data
//! should run [`SecretPolicy::FailClosed`] and load secrets from durable
//! storage with [`SecretStore::put`].

use crate::config::{EncryptionConfig, SecretPolicy};
use crate::error::{EntryError, EntryResult};
use journal_crypto::{SecretGenerator, UserSecret};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Outcome of [`SecretStore::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretValidation {
    pub is_valid: bool,
    pub reason: Option<String>,
}

impl SecretValidation {
    fn valid() -> Self {
        Self {
            is_valid: true,
            reason: None,
        }
    }

    fn invalid(reason: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Per-user secret cache shared across in-flight requests.
///
/// Clones share the same underlying map.
#[derive(Clone)]
pub struct SecretStore {
    secrets: Arc<RwLock<HashMap<String, UserSecret>>>,
    generator: SecretGenerator,
    policy: SecretPolicy,
    min_secret_length: usize,
}

impl SecretStore {
    /// Store with the default configuration (generate on miss).
    pub fn new() -> Self {
        let config = EncryptionConfig::default();
        Self {
            secrets: Arc::new(RwLock::new(HashMap::new())),
            generator: SecretGenerator::default(),
            policy: config.secret_policy,
            min_secret_length: config.min_secret_length,
        }
    }

    pub fn with_config(config: &EncryptionConfig) -> EntryResult<Self> {
        config.validate()?;
        let generator = SecretGenerator::new(config.secret_entropy_bytes)?;
        Ok(Self {
            secrets: Arc::new(RwLock::new(HashMap::new())),
            generator,
            policy: config.secret_policy,
            min_secret_length: config.min_secret_length,
        })
    }

    pub fn policy(&self) -> SecretPolicy {
        self.policy
    }

    /// Returns the user's secret.
    ///
    /// On a miss, [`SecretPolicy::GenerateOnMiss`] mints and caches a new
    /// secret; [`SecretPolicy::FailClosed`] returns
    /// [`EntryError::SecretNotFound`].
    pub async fn get(&self, user_id: &str) -> EntryResult<UserSecret> {
        if let Some(secret) = self.secrets.read().await.get(user_id) {
            return Ok(secret.clone());
        }

        match self.policy {
            SecretPolicy::GenerateOnMiss => Ok(self.get_or_generate(user_id).await),
            SecretPolicy::FailClosed => {
                warn!("no encryption secret cached for user {user_id}");
                Err(EntryError::SecretNotFound(user_id.to_string()))
            }
        }
    }

    /// Get-or-create regardless of policy. Used when provisioning an account.
    pub async fn provision(&self, user_id: &str) -> UserSecret {
        if let Some(secret) = self.secrets.read().await.get(user_id) {
            return secret.clone();
        }
        self.get_or_generate(user_id).await
    }

    /// Slow path. Re-checks under the write lock so concurrent first accesses
    /// for one user converge on a single secret.
    async fn get_or_generate(&self, user_id: &str) -> UserSecret {
        let mut secrets = self.secrets.write().await;
        if let Some(existing) = secrets.get(user_id) {
            debug!("secret for user {user_id} created by a concurrent request");
            return existing.clone();
        }

        let secret = self.generator.generate(user_id);
        secrets.insert(user_id.to_string(), secret.clone());
        info!("generated encryption secret for user {user_id}");
        secret
    }

    /// Inserts or replaces the user's secret.
    pub async fn put(&self, user_id: impl Into<String>, secret: UserSecret) {
        let user_id = user_id.into();
        debug!("storing encryption secret for user {user_id}");
        self.secrets.write().await.insert(user_id, secret);
    }

    pub async fn has(&self, user_id: &str) -> bool {
        self.secrets.read().await.contains_key(user_id)
    }

    /// Removes and scrubs the user's secret (logout). Returns whether one existed.
    pub async fn clear(&self, user_id: &str) -> bool {
        let removed = self.secrets.write().await.remove(user_id);
        if removed.is_some() {
            info!("cleared encryption secret for user {user_id}");
        }
        // Dropping the removed secret zeroizes it.
        removed.is_some()
    }

    /// Scrubs every cached secret (process shutdown).
    pub async fn clear_all(&self) {
        let mut secrets = self.secrets.write().await;
        let count = secrets.len();
        secrets.clear();
        info!("cleared {count} cached encryption secrets");
    }

    /// Checks that the user has a secret of at least the configured length.
    pub async fn validate(&self, user_id: &str) -> SecretValidation {
        let secrets = self.secrets.read().await;
        match secrets.get(user_id) {
            None => SecretValidation::invalid("no secret"),
            Some(secret) if secret.len() < self.min_secret_length => SecretValidation::invalid(
                format!(
                    "secret too short ({} < {})",
                    secret.len(),
                    self.min_secret_length
                ),
            ),
            Some(_) => SecretValidation::valid(),
        }
    }

    pub async fn len(&self) -> usize {
        self.secrets.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.secrets.read().await.is_empty()
    }
}

impl Default for SecretStore {
    fn default() -> Self {
        Self::new()
    }
}
