//! Record-scoped, content-addressed image storage.

use crate::{FilesError, FILES_FOLDER_NAME};
use chrono::{DateTime, Utc};
use dcr_types::NonEmptyText;
use dcr_uuid::{Sha256Hash, ShardedUuid};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

/// Metadata for a stored image.
///
/// Serialisable record of an image added to a record's content-addressed
/// storage. Its `hash` string is what callers persist as a version's
/// `image_ref`; the bytes can always be located again from the hash alone.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct ImageMetadata {
    /// Hashing algorithm used (always "sha256" for the current implementation)
    pub hash_algorithm: NonEmptyText,

    /// Hexadecimal digest of the image content
    pub hash: Sha256Hash,

    /// Path relative to the record root where the image is stored
    pub relative_path: NonEmptyText,

    /// Size of the image in bytes
    pub size_bytes: u64,

    /// Detected media type (MIME type), if available.
    ///
    /// Best-effort detection from the leading bytes; `None` when the content
    /// is not a recognised format.
    pub media_type: Option<NonEmptyText>,

    /// Original filename supplied by the caller
    pub original_filename: NonEmptyText,

    /// UTC timestamp when the image was stored
    pub stored_at: DateTime<Utc>,
}

/// Service for managing images within one record directory.
///
/// Each instance is bound to a single record (a patient directory, identified
/// by its sharded UUID under a root such as `clinic_data/patients`). Images
/// are identified by their SHA-256 digest, stored once, and never modified.
///
/// The service is stateless: construction validates that the record directory
/// exists, and the storage subtree is created lazily on first `add`.
#[derive(Debug)]
pub struct ImageStore {
    record_root: PathBuf,
}

impl ImageStore {
    /// Creates a new `ImageStore` for a specific record.
    ///
    /// # Arguments
    ///
    /// * `root_directory` - The root directory containing records of this type
    /// * `record_id` - The identifier of the record the images belong to
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - the root directory does not exist or is not a directory,
    /// - the record directory does not exist or is not a directory.
    pub fn new(root_directory: &Path, record_id: &ShardedUuid) -> Result<Self, FilesError> {
        if !root_directory.is_dir() {
            return Err(FilesError::InvalidRootDirectory(format!(
                "not an existing directory: {}",
                root_directory.display()
            )));
        }

        let root_directory = root_directory.canonicalize().map_err(|e| {
            FilesError::InvalidRootDirectory(format!(
                "cannot canonicalise {}: {}",
                root_directory.display(),
                e
            ))
        })?;

        let record_root = record_id.sharded_dir(&root_directory);
        if !record_root.is_dir() {
            return Err(FilesError::RecordNotFound(format!(
                "record directory does not exist: {}",
                record_root.display()
            )));
        }

        Ok(Self { record_root })
    }

    /// Adds image bytes to the record's content-addressed storage.
    ///
    /// Computes the SHA-256 digest of `bytes` and stores them at
    /// `files/sha256/<s1>/<digest>` inside the record directory. Adding the
    /// same content twice is an error: stored images are immutable and the
    /// first copy is authoritative.
    ///
    /// # Arguments
    ///
    /// * `bytes` - Raw image content
    /// * `original_filename` - Filename to record in the metadata (for audit
    ///   display only; it does not influence the storage location)
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - an image with the same digest already exists ([`FilesError::ImageAlreadyExists`]),
    /// - storage directory creation or the write fails (I/O).
    pub fn add_bytes(
        &self,
        bytes: &[u8],
        original_filename: &NonEmptyText,
    ) -> Result<ImageMetadata, FilesError> {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let digest = hex::encode(hasher.finalize());
        let hash = Sha256Hash::parse(&digest).expect("hex::encode yields lowercase hex");

        let storage_path = self.storage_path(&hash);
        if storage_path.exists() {
            return Err(FilesError::ImageAlreadyExists(hash.to_string()));
        }

        if let Some(parent) = storage_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&storage_path, bytes)?;

        let media_type = infer::get(bytes)
            .map(|kind| NonEmptyText::new(kind.mime_type()).expect("mime type is non-empty"));

        Ok(ImageMetadata {
            hash_algorithm: NonEmptyText::new("sha256").expect("sha256 is non-empty"),
            hash: hash.clone(),
            relative_path: NonEmptyText::new(self.relative_path(&hash).to_string_lossy())
                .expect("relative path is non-empty"),
            size_bytes: bytes.len() as u64,
            media_type,
            original_filename: original_filename.clone(),
            stored_at: Utc::now(),
        })
    }

    /// Retrieves stored image bytes by hash.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if:
    /// - `hash` is not a valid SHA-256 digest string ([`FilesError::InvalidHash`]),
    /// - no image with that digest exists ([`FilesError::ImageNotFound`]),
    /// - the read fails (I/O).
    pub fn read(&self, hash: &str) -> Result<Vec<u8>, FilesError> {
        let hash = Sha256Hash::parse(hash)?;
        let storage_path = self.storage_path(&hash);
        if !storage_path.is_file() {
            return Err(FilesError::ImageNotFound(hash.to_string()));
        }
        Ok(fs::read(&storage_path)?)
    }

    /// Returns true if an image with the given digest is present.
    pub fn contains(&self, hash: &Sha256Hash) -> bool {
        self.storage_path(hash).is_file()
    }

    fn storage_path(&self, hash: &Sha256Hash) -> PathBuf {
        self.record_root.join(self.relative_path(hash))
    }

    fn relative_path(&self, hash: &Sha256Hash) -> PathBuf {
        let (s1, _) = hash.shard_prefixes();
        Path::new(FILES_FOLDER_NAME)
            .join("sha256")
            .join(s1)
            .join(hash.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // Minimal valid PNG header so media type detection has something to find.
    const PNG_BYTES: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D,
    ];

    fn store_with_record(temp: &TempDir) -> (ImageStore, ShardedUuid) {
        let root = temp.path().join("patients");
        let record_id = ShardedUuid::new();
        fs::create_dir_all(record_id.sharded_dir(&root)).expect("create record dir");
        let store = ImageStore::new(&root, &record_id).expect("store should construct");
        (store, record_id)
    }

    #[test]
    fn new_rejects_missing_root() {
        let temp = TempDir::new().unwrap();
        let err = ImageStore::new(&temp.path().join("absent"), &ShardedUuid::new()).unwrap_err();
        assert!(matches!(err, FilesError::InvalidRootDirectory(_)));
    }

    #[test]
    fn new_rejects_missing_record_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("patients");
        fs::create_dir_all(&root).unwrap();
        let err = ImageStore::new(&root, &ShardedUuid::new()).unwrap_err();
        assert!(matches!(err, FilesError::RecordNotFound(_)));
    }

    #[test]
    fn add_bytes_stores_content_addressed() {
        let temp = TempDir::new().unwrap();
        let (store, _) = store_with_record(&temp);

        let filename = NonEmptyText::new("chart.png").unwrap();
        let metadata = store.add_bytes(PNG_BYTES, &filename).unwrap();

        assert_eq!(metadata.hash_algorithm.as_str(), "sha256");
        assert_eq!(metadata.size_bytes, PNG_BYTES.len() as u64);
        assert_eq!(metadata.original_filename.as_str(), "chart.png");
        assert!(store.contains(&metadata.hash));

        let bytes = store.read(metadata.hash.as_str()).unwrap();
        assert_eq!(bytes, PNG_BYTES);
    }

    #[test]
    fn add_bytes_detects_png_media_type() {
        let temp = TempDir::new().unwrap();
        let (store, _) = store_with_record(&temp);

        let metadata = store
            .add_bytes(PNG_BYTES, &NonEmptyText::new("chart.png").unwrap())
            .unwrap();
        assert_eq!(
            metadata.media_type.map(|m| m.as_str().to_owned()),
            Some("image/png".to_owned())
        );
    }

    #[test]
    fn add_bytes_rejects_duplicate_content() {
        let temp = TempDir::new().unwrap();
        let (store, _) = store_with_record(&temp);
        let filename = NonEmptyText::new("chart.png").unwrap();

        store.add_bytes(PNG_BYTES, &filename).unwrap();
        let err = store.add_bytes(PNG_BYTES, &filename).unwrap_err();
        assert!(matches!(err, FilesError::ImageAlreadyExists(_)));
    }

    #[test]
    fn read_unknown_hash_is_not_found() {
        let temp = TempDir::new().unwrap();
        let (store, _) = store_with_record(&temp);

        let err = store
            .read("b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9")
            .unwrap_err();
        assert!(matches!(err, FilesError::ImageNotFound(_)));
    }

    #[test]
    fn read_rejects_malformed_hash() {
        let temp = TempDir::new().unwrap();
        let (store, _) = store_with_record(&temp);

        let err = store.read("not-a-digest").unwrap_err();
        assert!(matches!(err, FilesError::InvalidHash(_)));
    }
}
