//! Content checksums
//!
//! Backends report digests base64 encoded (the `Content-MD5` convention);
//! clients receive them as lowercase hex.

use base64::{Engine as _, engine::general_purpose};
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Backend returned a digest that is not valid base64
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed backend checksum {encoded:?}: {reason}")]
pub struct ChecksumError {
    pub encoded: String,
    pub reason: String,
}

/// Raw digest bytes of a stored object
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Checksum(Vec<u8>);

impl Checksum {
    /// Decode a digest as reported by a backend
    pub fn from_backend(encoded: &str) -> Result<Self, ChecksumError> {
        general_purpose::STANDARD
            .decode(encoded)
            .map(Self)
            .map_err(|e| ChecksumError {
                encoded: encoded.to_string(),
                reason: e.to_string(),
            })
    }

    /// Digest bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Lowercase hex form
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Checksum {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}
