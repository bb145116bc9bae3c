//! Encrypted journal entries.
//!
//! Sits between the API layer and a partition/sort-key storage engine:
//! - Per-user secret cache with generate-on-miss or fail-closed policy
//! - Composite entry identifiers (`user_id-topic_id-timestamp`)
//! - Entry codec sealing title and content with AES-256-GCM
//! - Entry service: create, get, update, delete and bulk listing that
//!   skips unreadable records instead of aborting
//!
//! The storage engine only ever sees ciphertext plus `user_id`, `topic_id`,
//! word count and timestamps.

pub mod codec;
pub mod config;
pub mod error;
pub mod identifier;
pub mod secret_store;
pub mod service;
pub mod storage;
pub mod types;

pub use codec::{DecryptedFields, EncryptedFields, decrypt_entry, encrypt_entry};
pub use config::{EncryptionConfig, SecretPolicy};
pub use error::{EntryError, EntryResult, ErrorKind};
pub use identifier::{EntryIdentifier, compose_identifier, parse_identifier, parse_storage_key};
pub use secret_store::{SecretStore, SecretValidation};
pub use service::EntryService;
pub use storage::{EntryStorage, MemoryEntryStorage};
pub use types::{EncryptedEntry, EntryUpdate, PlaintextEntry};
