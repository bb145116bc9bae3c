//! Composite entry identifiers.
//!
//! The externally visible id is `user_id-topic_id-timestamp`; the storage sort
//! key drops the leading `user_id-`. Because `user_id` is a hyphenated UUID
//! (five segments), the first five hyphen-delimited segments are always the
//! user and everything after is rejoined verbatim, so topics may contain
//! hyphens. The timestamp is the final segment.

use crate::error::{EntryError, EntryResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const SEPARATOR: char = '-';

/// Number of hyphen-delimited segments in a hyphenated UUID.
pub const USER_ID_SEGMENTS: usize = 5;

/// Structured form of a composite entry id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntryIdentifier {
    user_id: String,
    topic_id: String,
    timestamp: u64,
}

impl EntryIdentifier {
    /// Builds an identifier, rejecting a `user_id` that is not a hyphenated
    /// UUID and an empty `topic_id`.
    pub fn new(
        user_id: impl Into<String>,
        topic_id: impl Into<String>,
        timestamp: u64,
    ) -> EntryResult<Self> {
        let user_id = user_id.into();
        let topic_id = topic_id.into();
        validate_user_id(&user_id)?;
        if topic_id.is_empty() {
            return Err(EntryError::InvalidIdentifier(
                "topic id is empty".to_string(),
            ));
        }
        Ok(Self {
            user_id,
            topic_id,
            timestamp,
        })
    }

    /// Rebuilds an identifier from a storage partition key and sort key.
    pub fn from_storage_key(user_id: &str, sort_key: &str) -> EntryResult<Self> {
        let (topic_id, timestamp) = sort_key.rsplit_once(SEPARATOR).ok_or_else(|| {
            EntryError::InvalidIdentifier(format!("sort key {sort_key:?} has no timestamp"))
        })?;
        Self::new(user_id, topic_id, parse_timestamp(timestamp)?)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Storage sort key: `topic_id-timestamp`.
    pub fn sort_key(&self) -> String {
        format!("{}{SEPARATOR}{}", self.topic_id, self.timestamp)
    }

    /// Same user and topic, different timestamp.
    pub(crate) fn with_timestamp(&self, timestamp: u64) -> Self {
        Self {
            timestamp,
            ..self.clone()
        }
    }
}

impl fmt::Display for EntryIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            self.user_id, self.topic_id, self.timestamp
        )
    }
}

impl FromStr for EntryIdentifier {
    type Err = EntryError;

    fn from_str(s: &str) -> EntryResult<Self> {
        let (user_id, sort_key) = parse_storage_key(s)?;
        Self::from_storage_key(&user_id, &sort_key)
    }
}

impl TryFrom<String> for EntryIdentifier {
    type Error = EntryError;

    fn try_from(value: String) -> EntryResult<Self> {
        value.parse()
    }
}

impl From<EntryIdentifier> for String {
    fn from(id: EntryIdentifier) -> Self {
        id.to_string()
    }
}

/// `user_id-topic_id-timestamp`.
pub fn compose_identifier(user_id: &str, topic_id: &str, timestamp: u64) -> EntryResult<String> {
    Ok(EntryIdentifier::new(user_id, topic_id, timestamp)?.to_string())
}

/// Inverse of [`compose_identifier`].
pub fn parse_identifier(id: &str) -> EntryResult<EntryIdentifier> {
    id.parse()
}

/// Splits a composite id into `(user_id, sort_key)`.
///
/// Fails when fewer than six hyphen-delimited segments are present or the
/// first five do not form a UUID.
pub fn parse_storage_key(id: &str) -> EntryResult<(String, String)> {
    let segments: Vec<&str> = id.split(SEPARATOR).collect();
    if segments.len() <= USER_ID_SEGMENTS {
        return Err(EntryError::InvalidIdentifier(format!(
            "expected at least {} hyphen-delimited segments, got {}",
            USER_ID_SEGMENTS + 1,
            segments.len()
        )));
    }

    let user_id = segments[..USER_ID_SEGMENTS].join("-");
    validate_user_id(&user_id)?;
    let sort_key = segments[USER_ID_SEGMENTS..].join("-");
    Ok((user_id, sort_key))
}

/// Accepts only the form `u64` displays as, so that `sort_key()` reproduces
/// the segment exactly: ASCII digits with no sign and no leading zero.
fn parse_timestamp(segment: &str) -> EntryResult<u64> {
    let digits = !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit());
    if !digits {
        return Err(EntryError::InvalidIdentifier(format!(
            "timestamp {segment:?} is not a number"
        )));
    }
    if segment.len() > 1 && segment.starts_with('0') {
        return Err(EntryError::InvalidIdentifier(format!(
            "timestamp {segment:?} has a leading zero"
        )));
    }
    segment.parse::<u64>().map_err(|_| {
        EntryError::InvalidIdentifier(format!("timestamp {segment:?} is out of range"))
    })
}

fn validate_user_id(user_id: &str) -> EntryResult<()> {
    let hyphenated = user_id.split(SEPARATOR).count() == USER_ID_SEGMENTS;
    if !hyphenated || Uuid::try_parse(user_id).is_err() {
        return Err(EntryError::InvalidIdentifier(format!(
            "user id {user_id:?} is not a hyphenated UUID"
        )));
    }
    Ok(())
}
