//! Shared repository utilities.

use crate::error::{RecordError, RecordResult};
use dcr_uuid::ShardedUuid;
use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

/// Creates a unique sharded directory within the base records directory.
///
/// Generates identifiers using the provided source function and attempts to
/// create the corresponding sharded directory. Guards against UUID collisions
/// or pre-existing directories from external interference by retrying up to 5
/// times with fresh identifiers.
///
/// # Arguments
///
/// * `base_dir` - The base records directory.
/// * `uuid_source` - A closure yielding fresh identifiers.
///
/// # Errors
///
/// Returns [`RecordError::RecordDirCreation`] if parent directory creation
/// fails or no unique directory could be created after 5 attempts.
pub(crate) fn create_uuid_and_shard_dir(
    base_dir: &Path,
    mut uuid_source: impl FnMut() -> ShardedUuid,
) -> RecordResult<(ShardedUuid, PathBuf)> {
    for _attempt in 0..5 {
        let uuid = uuid_source();
        let candidate = uuid.sharded_dir(base_dir);

        if candidate.exists() {
            continue;
        }

        if let Some(parent) = candidate.parent() {
            fs::create_dir_all(parent).map_err(RecordError::RecordDirCreation)?;
        }

        match fs::create_dir(&candidate) {
            Ok(()) => return Ok((uuid, candidate)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(RecordError::RecordDirCreation(e)),
        }
    }

    Err(RecordError::RecordDirCreation(io::Error::new(
        ErrorKind::AlreadyExists,
        "failed to allocate a unique record directory after 5 attempts",
    )))
}
