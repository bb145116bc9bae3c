//! Encryption subsystem configuration.

use crate::error::{EntryError, EntryResult};
use journal_crypto::{DEFAULT_ENTROPY_BYTES, MAX_ENTROPY_BYTES, MIN_ENTROPY_BYTES};
use serde::{Deserialize, Serialize};

/// What the secret store does when asked for a user it has no secret for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecretPolicy {
    /// Mint and cache a new secret. Records sealed under a previous secret
    /// become unreadable.
    #[default]
    GenerateOnMiss,
    /// Fail with `SecretNotFound`. New accounts go through explicit provisioning.
    FailClosed,
}

/// Configuration for the secret store and entry service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncryptionConfig {
    pub secret_policy: SecretPolicy,

    /// Secrets shorter than this fail `validate`.
    pub min_secret_length: usize,

    /// Random bytes mixed into each generated secret (16..=32).
    pub secret_entropy_bytes: usize,
}

impl Default for EncryptionConfig {
    fn default() -> Self {
        Self {
            secret_policy: SecretPolicy::GenerateOnMiss,
            min_secret_length: 32,
            secret_entropy_bytes: DEFAULT_ENTROPY_BYTES,
        }
    }
}

impl EncryptionConfig {
    /// Parses a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> EntryResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EntryResult<()> {
        if !(MIN_ENTROPY_BYTES..=MAX_ENTROPY_BYTES).contains(&self.secret_entropy_bytes) {
            return Err(EntryError::Config(format!(
                "secret_entropy_bytes must be between {MIN_ENTROPY_BYTES} and {MAX_ENTROPY_BYTES}, got {}",
                self.secret_entropy_bytes
            )));
        }
        if self.min_secret_length == 0 {
            return Err(EntryError::Config(
                "min_secret_length must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Config used by tests: fail-closed so a missing secret is loud.
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            secret_policy: SecretPolicy::FailClosed,
            ..Self::default()
        }
    }
}
