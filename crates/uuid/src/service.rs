//! Implementation of the canonical UUID wrapper and the version identifier.

use crate::{UuidError, UuidResult};
use chrono::{DateTime, Duration, Utc};
use std::path::{Path, PathBuf};
use std::{fmt, str::FromStr};

/// Re-exported for convenience.
pub use ::uuid::Uuid;

/// DCR's canonical UUID representation (32 lowercase hex characters, no hyphens).
///
/// This wrapper guarantees that once constructed, the contained UUID is in canonical
/// form, which keeps sharded path derivation deterministic across the system.
///
/// # When to use this type
/// - Accepting a record identifier from *outside* the core (CLI input, API request).
/// - Deriving a sharded storage path for a patient or appointment book entry.
/// - Generating new record identifiers.
///
/// # Construction
/// - [`ShardedUuid::new`] generates a fresh canonical UUID.
/// - [`ShardedUuid::parse`] validates an externally supplied identifier; other common
///   UUID forms (hyphenated, uppercase) are deliberately **not** normalised and are
///   rejected instead.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShardedUuid(Uuid);

impl Default for ShardedUuid {
    fn default() -> Self {
        Self::new()
    }
}

impl ShardedUuid {
    /// Generates a new UUID in canonical form, suitable for a fresh record.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Validates and parses a UUID string that must already be in canonical form.
    ///
    /// # Errors
    ///
    /// Returns [`UuidError::InvalidInput`] if `input` is not 32 lowercase hex characters.
    pub fn parse(input: &str) -> UuidResult<Self> {
        if Self::is_canonical(input) {
            // is_canonical guarantees valid hex, so parse_str cannot fail
            let uuid = Uuid::parse_str(input).expect("is_canonical guarantees valid UUID");
            return Ok(Self(uuid));
        }
        Err(UuidError::InvalidInput(format!(
            "UUID must be 32 lowercase hex characters without hyphens, got: '{}'",
            input
        )))
    }

    /// Returns the underlying `uuid::Uuid`.
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// Returns true if `input` is in canonical form.
    ///
    /// Purely syntactic: exactly 32 bytes, lowercase hex only.
    pub fn is_canonical(input: &str) -> bool {
        input.len() == 32
            && input
                .bytes()
                .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Returns `parent_dir/<s1>/<s2>/<uuid>/` where `s1`/`s2` are the first two
    /// hex character pairs of this UUID.
    ///
    /// This sharding keeps directory fan-out bounded when a clinic accumulates
    /// many thousands of records.
    pub fn sharded_dir(&self, parent_dir: &Path) -> PathBuf {
        let canonical = self.0.simple().to_string();
        let s1 = &canonical[0..2];
        let s2 = &canonical[2..4];
        parent_dir.join(s1).join(s2).join(&canonical)
    }
}

impl fmt::Display for ShardedUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl FromStr for ShardedUuid {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShardedUuid::parse(s)
    }
}

impl serde::Serialize for ShardedUuid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for ShardedUuid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ShardedUuid::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A time-prefixed identifier for immutable odontogram versions.
///
/// Format:
/// `YYYYMMDDTHHMMSS.mmmZ-<canonical_uuid>`
///
/// Example:
/// `20260111T143522.045Z-550e8400e29b41d4a716446655440000`
///
/// Properties:
/// - Globally unique (UUID component)
/// - Human-readable and lexicographically sortable by creation time
/// - Monotonic per patient when generated against the previous id
///
/// # Monotonicity
///
/// [`VersionId::generate`] with the newest existing id guarantees a timestamp
/// strictly greater than the previous one (bumped by at least 1ms when the
/// clock has not advanced). Version listing order relies on this.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VersionId {
    timestamp: DateTime<Utc>,
    uuid: ShardedUuid,
}

impl VersionId {
    /// Returns the timestamp component.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Returns the UUID component.
    pub fn uuid(&self) -> &ShardedUuid {
        &self.uuid
    }

    /// Generate a new version id.
    ///
    /// If `last` is provided, the timestamp is guaranteed to be strictly
    /// greater than the last one (by at least 1 ms).
    pub fn generate(last: Option<&VersionId>) -> Self {
        let now = Utc::now();

        let timestamp = match last {
            Some(prev) if now <= prev.timestamp => prev.timestamp + Duration::milliseconds(1),
            _ => now,
        };

        Self {
            timestamp,
            uuid: ShardedUuid::new(),
        }
    }
}

impl FromStr for VersionId {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (ts_str, uuid_str) = s
            .split_once('-')
            .ok_or_else(|| UuidError::InvalidInput(format!("Invalid version id format: '{}'", s)))?;

        if !ts_str.ends_with('Z') {
            return Err(UuidError::InvalidInput(format!(
                "Version id timestamp must end with 'Z': '{}'",
                ts_str
            )));
        }

        let ts_no_z = &ts_str[..ts_str.len() - 1];
        let naive =
            chrono::NaiveDateTime::parse_from_str(ts_no_z, "%Y%m%dT%H%M%S%.3f").map_err(|e| {
                UuidError::InvalidInput(format!("Invalid timestamp format '{}': {}", ts_str, e))
            })?;

        let timestamp = DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc);
        let uuid = ShardedUuid::parse(uuid_str)?;

        Ok(Self { timestamp, uuid })
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.timestamp.format("%Y%m%dT%H%M%S%.3fZ"),
            self.uuid
        )
    }
}

impl serde::Serialize for VersionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for VersionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        VersionId::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_generates_canonical_uuid() {
        let id = ShardedUuid::new();
        let canonical = id.to_string();
        assert_eq!(canonical.len(), 32);
        assert!(ShardedUuid::is_canonical(&canonical));
    }

    #[test]
    fn parse_accepts_canonical_uuid() {
        let canonical = "550e8400e29b41d4a716446655440000";
        let id = ShardedUuid::parse(canonical).unwrap();
        assert_eq!(id.to_string(), canonical);
    }

    #[test]
    fn parse_rejects_hyphenated_uuid() {
        let result = ShardedUuid::parse("550e8400-e29b-41d4-a716-446655440000");
        match result {
            Err(UuidError::InvalidInput(msg)) => {
                assert!(msg.contains("32 lowercase hex characters"));
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn parse_rejects_uppercase_uuid() {
        assert!(ShardedUuid::parse("550E8400E29B41D4A716446655440000").is_err());
    }

    #[test]
    fn sharded_dir_uses_two_level_prefix() {
        let id = ShardedUuid::parse("550e8400e29b41d4a716446655440000").unwrap();
        let dir = id.sharded_dir(Path::new("/data/patients"));
        assert_eq!(
            dir,
            Path::new("/data/patients/55/0e/550e8400e29b41d4a716446655440000")
        );
    }

    #[test]
    fn version_id_round_trips_through_display() {
        let id = VersionId::generate(None);
        let rendered = id.to_string();
        let parsed: VersionId = rendered.parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn version_id_is_monotonic_against_previous() {
        let first = VersionId::generate(None);
        let second = VersionId::generate(Some(&first));
        assert!(second.timestamp() > first.timestamp());
    }

    #[test]
    fn version_id_bumps_when_clock_stands_still() {
        // A previous id minted far in the future forces the 1ms bump path.
        let future = VersionId {
            timestamp: Utc::now() + Duration::days(365),
            uuid: ShardedUuid::new(),
        };
        let next = VersionId::generate(Some(&future));
        assert_eq!(next.timestamp(), future.timestamp() + Duration::milliseconds(1));
    }

    #[test]
    fn version_id_rejects_missing_z_suffix() {
        let err = "20260111T143522.045-550e8400e29b41d4a716446655440000"
            .parse::<VersionId>()
            .unwrap_err();
        assert!(matches!(err, UuidError::InvalidInput(_)));
    }

    #[test]
    fn version_ids_sort_lexicographically_by_time() {
        let older = "20250111T143522.045Z-550e8400e29b41d4a716446655440000";
        let newer = "20260111T143522.045Z-550e8400e29b41d4a716446655440000";
        assert!(newer > older);
        let older_id: VersionId = older.parse().unwrap();
        let newer_id: VersionId = newer.parse().unwrap();
        assert!(newer_id.timestamp() > older_id.timestamp());
    }
}
