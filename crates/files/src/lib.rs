//! DCR image storage.
//!
//! Odontogram versions may carry a rendered raster image of the tooth chart.
//! The version record itself stores only an opaque reference; the bytes live in
//! a content-addressed area inside the owning patient's record directory.
//!
//! ## Design principles
//!
//! - Semantic records and binary bytes are deliberately separated
//! - Binary files are not tracked in Git (the `files/` area is gitignored)
//! - Binary files are immutable once added (new content creates a new file)
//! - Record repositories remain valid even when binary files are absent
//! - No global or cross-repository binary namespace exists
//!
//! ## Storage layout
//!
//! ```text
//! <record_type>/
//! └── <s1>/<s2>/<record_id>/
//!     ├── .gitignore
//!     ├── <versioned record files>
//!     └── files/          # gitignored
//!         └── sha256/
//!             └── ab/
//!                 └── ab3f9e…
//! ```

mod store;

pub use dcr_uuid::ShardedUuid;
pub use store::{ImageMetadata, ImageStore};

/// Directory name of the gitignored binary area inside a record directory.
pub const FILES_FOLDER_NAME: &str = "files";

/// Errors that can occur during image storage operations.
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Root directory does not exist or is not a directory
    #[error("Invalid root directory: {0}")]
    InvalidRootDirectory(String),

    /// Record directory does not exist
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// Image already exists in content-addressed storage
    #[error("Image with hash {0} already exists in storage")]
    ImageAlreadyExists(String),

    /// Image hash not present in storage
    #[error("Image with hash {0} not found in storage")]
    ImageNotFound(String),

    /// Supplied hash string is not a valid SHA-256 digest
    #[error("Invalid image hash: {0}")]
    InvalidHash(#[from] dcr_uuid::UuidError),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
