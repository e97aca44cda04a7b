//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core
//! services as `Arc<CoreConfig>`. Services never read process-wide environment
//! variables during request handling; doing so leads to inconsistent behaviour
//! in multi-threaded runtimes and test harnesses, and it hides the dependency
//! from callers who want to substitute a test directory.

use crate::constants::{APPOINTMENT_BOOK_DIR_NAME, PATIENTS_DIR_NAME};
use crate::{RecordError, RecordResult};
use dcr_types::NonEmptyText;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    clinic_data_dir: PathBuf,
    clinic_name: NonEmptyText,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Arguments
    ///
    /// * `clinic_data_dir` - Root directory for all clinic record storage
    /// * `clinic_name` - Display name of the clinic; used as the care location
    ///   on commits created by background jobs
    ///
    /// # Errors
    ///
    /// Returns `RecordError::InvalidInput` if `clinic_data_dir` is empty.
    pub fn new(clinic_data_dir: PathBuf, clinic_name: NonEmptyText) -> RecordResult<Self> {
        if clinic_data_dir.as_os_str().is_empty() {
            return Err(RecordError::InvalidInput(
                "clinic_data_dir cannot be empty".into(),
            ));
        }

        Ok(Self {
            clinic_data_dir,
            clinic_name,
        })
    }

    pub fn clinic_data_dir(&self) -> &Path {
        &self.clinic_data_dir
    }

    pub fn patients_dir(&self) -> PathBuf {
        self.clinic_data_dir.join(PATIENTS_DIR_NAME)
    }

    pub fn appointment_book_dir(&self) -> PathBuf {
        self.clinic_data_dir.join(APPOINTMENT_BOOK_DIR_NAME)
    }

    pub fn clinic_name(&self) -> &NonEmptyText {
        &self.clinic_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_storage_directories_from_root() {
        let cfg = CoreConfig::new(
            PathBuf::from("/data/clinic"),
            NonEmptyText::new("Clinica Dental Sol").unwrap(),
        )
        .unwrap();

        assert_eq!(cfg.patients_dir(), Path::new("/data/clinic/patients"));
        assert_eq!(
            cfg.appointment_book_dir(),
            Path::new("/data/clinic/appointment_book")
        );
    }

    #[test]
    fn rejects_empty_data_dir() {
        let err = CoreConfig::new(
            PathBuf::new(),
            NonEmptyText::new("Clinica Dental Sol").unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, RecordError::InvalidInput(_)));
    }
}
