//! Entry layer error types.

use journal_crypto::CryptoError;
use thiserror::Error;

/// Result type for entry operations.
pub type EntryResult<T> = Result<T, EntryError>;

/// Errors that can occur while storing or reading encrypted entries.
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("invalid entry identifier: {0}")]
    InvalidIdentifier(String),

    #[error("no secret for user {0}")]
    SecretNotFound(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Coarse classification a caller uses to decide between retry, skip and abort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedField,
    Decryption,
    InvalidIdentifier,
    SecretNotFound,
    Storage,
    Config,
    Internal,
}

impl EntryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Crypto(CryptoError::MalformedField { .. }) => ErrorKind::MalformedField,
            Self::Crypto(CryptoError::Decryption(_)) => ErrorKind::Decryption,
            Self::Crypto(_) => ErrorKind::Internal,
            Self::InvalidIdentifier(_) => ErrorKind::InvalidIdentifier,
            Self::SecretNotFound(_) => ErrorKind::SecretNotFound,
            Self::Storage(_) => ErrorKind::Storage,
            Self::Serialization(_) => ErrorKind::Internal,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// 400-class: the request itself is wrong.
    pub fn is_caller_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidIdentifier | ErrorKind::Config)
    }

    /// Only storage failures are worth retrying. Decrypting again with the
    /// same key cannot succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Storage
    }

    /// A single stored record is unusable; bulk readers skip it and continue.
    pub fn is_corrupt_record(&self) -> bool {
        matches!(self.kind(), ErrorKind::MalformedField | ErrorKind::Decryption)
    }
}
