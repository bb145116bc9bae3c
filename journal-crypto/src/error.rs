//! Error types for the crypto layer.

use thiserror::Error;

/// Result type for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Errors that can occur while deriving keys or sealing/opening fields.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// A stored field does not have the expected shape (hex length or charset).
    /// Detected before any decryption is attempted.
    #[error("malformed {field}: {reason}")]
    MalformedField { field: &'static str, reason: String },

    /// Authentication tag did not verify: wrong secret, corrupted or tampered data.
    #[error("decryption failed: {0}")]
    Decryption(String),

    #[error("encryption failed: {0}")]
    Encryption(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid secret: {0}")]
    InvalidSecret(String),
}

impl CryptoError {
    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedField {
            field,
            reason: reason.into(),
        }
    }
}
