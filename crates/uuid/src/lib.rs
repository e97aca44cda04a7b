//! Identifier and sharded-path utilities.
//!
//! DCR stores clinic records under sharded directories derived from a UUID.
//!
//! To keep path derivation deterministic and consistent across the codebase, DCR uses a
//! *canonical* UUID representation for storage identifiers: **32 lowercase hexadecimal
//! characters** (no hyphens).
//!
//! This crate provides:
//! - A wrapper type ([`ShardedUuid`]) that *guarantees* the canonical format once constructed.
//! - Shared sharding logic to derive record directory locations from an identifier.
//! - The timestamp-prefixed [`VersionId`] used for immutable odontogram versions.
//! - A validated [`Sha256Hash`] used by content-addressed file storage.
//!
//! ## Canonical UUID form
//! - Length: 32
//! - Characters: `0-9` and `a-f` only
//! - Example: `550e8400e29b41d4a716446655440000`
//!
//! Non-canonical values (uppercase, hyphenated, wrong length, non-hex) are rejected by
//! [`ShardedUuid::parse`].
//!
//! ## Sharded directory layout
//! For a canonical UUID `u`, DCR stores data under:
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`
//!
//! This scheme prevents very large fan-out in a single directory and supports incremental
//! backups of individual shards.

mod service;

pub use service::{ShardedUuid, Uuid, VersionId};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Invalid input provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;

/// A validated SHA-256 digest in lowercase hexadecimal form.
///
/// Used as the content address for binary files stored alongside record
/// repositories. Guaranteed to be exactly 64 lowercase hex characters once
/// constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct Sha256Hash(String);

impl Sha256Hash {
    /// Validates and wraps a hex digest string.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if the input is not 64 lowercase hex characters.
    pub fn parse(input: impl AsRef<str>) -> UuidResult<Self> {
        let input = input.as_ref();
        let ok = input.len() == 64
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        if !ok {
            return Err(UuidError::InvalidInput(format!(
                "SHA-256 digest must be 64 lowercase hex characters, got: '{}'",
                input
            )));
        }
        Ok(Self(input.to_owned()))
    }

    /// Returns the digest as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the two-level shard prefixes (`digest[0..2]`, `digest[2..4]`).
    pub fn shard_prefixes(&self) -> (&str, &str) {
        (&self.0[0..2], &self.0[2..4])
    }
}

impl std::fmt::Display for Sha256Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Sha256Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Sha256Hash::parse(&s).map_err(serde::de::Error::custom)
    }
}
