//! Storage key validation
//!
//! Every object name reaching a backend goes through [`StorageKey::parse`].
//! The rules are the intersection of what the supported object stores accept,
//! so a key that parses is valid for store, get, exists and delete alike.

use std::fmt;
use thiserror::Error;

/// Maximum key length in bytes
pub const MAX_KEY_LEN: usize = 1024;

/// Reasons a client-supplied name is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidKey {
    #[error("name is empty")]
    Empty,

    #[error("name is {len} bytes, maximum is {max}")]
    TooLong { len: usize, max: usize },

    #[error("name contains forbidden character {0:?}")]
    ForbiddenChar(char),

    #[error("name must not start or end with '/'")]
    EdgeSlash,

    #[error("name contains an empty path segment")]
    EmptySegment,

    #[error("name contains a relative path segment")]
    RelativeSegment,

    #[error("name must not end with '.'")]
    TrailingDot,
}

/// A validated, backend-safe object name
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(String);

impl StorageKey {
    /// Validate a raw name into a key
    pub fn parse(raw: &str) -> Result<Self, InvalidKey> {
        if raw.trim().is_empty() {
            return Err(InvalidKey::Empty);
        }

        if raw.len() > MAX_KEY_LEN {
            return Err(InvalidKey::TooLong {
                len: raw.len(),
                max: MAX_KEY_LEN,
            });
        }

        if let Some(c) = raw.chars().find(|c| c.is_control() || *c == '\\') {
            return Err(InvalidKey::ForbiddenChar(c));
        }

        if raw.starts_with('/') || raw.ends_with('/') {
            return Err(InvalidKey::EdgeSlash);
        }

        for segment in raw.split('/') {
            match segment {
                "" => return Err(InvalidKey::EmptySegment),
                "." | ".." => return Err(InvalidKey::RelativeSegment),
                _ => {}
            }
        }

        if raw.ends_with('.') {
            return Err(InvalidKey::TrailingDot);
        }

        Ok(Self(raw.to_string()))
    }

    /// Get the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the key into its string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for StorageKey {
    type Error = InvalidKey;

    fn try_from(raw: &str) -> Result<Self, Self::Error> {
        Self::parse(raw)
    }
}

impl std::str::FromStr for StorageKey {
    type Err = InvalidKey;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}
