//! Patient record management.
//!
//! This module provides functionality for initialising and updating patient
//! records within the DCR system. It handles:
//!
//! - Creation of new patient records with unique identifiers
//! - Storage in a sharded directory structure under `clinic_data/patients/`
//! - Version control using Git for every change
//! - Updates to name, birth date, and phone contact information
//!
//! ## Storage Layout
//!
//! Patient records are stored as YAML files in a sharded structure:
//!
//! ```text
//! patients/
//!   <s1>/
//!     <s2>/
//!       <uuid>/
//!         patient.yaml    # demographics
//!         odontogram/     # immutable odontogram versions (see the
//!                         # odontogram repository module)
//!         files/          # gitignored image storage
//!         .git/           # repository for versioning
//! ```
//!
//! where `s1` and `s2` are the first four hex characters of the UUID.

use crate::author::Author;
use crate::config::CoreConfig;
use crate::constants::{DEFAULT_GITIGNORE, PATIENT_FILE_NAME};
use crate::error::{RecordError, RecordResult};
use crate::repositories::shared::create_uuid_and_shard_dir;
use crate::versioned_files::{CommitAction, CommitDomain, CommitMessage, FileToWrite, VersionedFileService};
use chrono::{DateTime, Utc};
use dcr_types::{NonEmptyText, PhoneNumber};
use dcr_uuid::ShardedUuid;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The stored demographics of one patient.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PatientRecord {
    pub id: ShardedUuid,
    #[serde(default)]
    pub given_names: Vec<String>,
    #[serde(default)]
    pub family_name: Option<String>,
    /// Birth date as `YYYY-MM-DD`.
    #[serde(default)]
    pub birth_date: Option<String>,
    /// Contact number for appointment reminders. A patient without one is
    /// silently skipped by reminder dispatch.
    #[serde(default)]
    pub phone: Option<PhoneNumber>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl PatientRecord {
    /// Display name for messages and listings: given names then family name.
    pub fn display_name(&self) -> String {
        let mut parts: Vec<&str> = self.given_names.iter().map(String::as_str).collect();
        if let Some(family) = &self.family_name {
            parts.push(family);
        }
        parts.join(" ")
    }
}

/// Marker type: patient record does not yet exist.
///
/// Used in the type-state pattern to prevent operations on non-existent
/// records. Only `initialise()` can be called in this state.
#[derive(Clone, Copy, Debug)]
pub struct Uninitialised;

/// Marker type: patient record exists.
#[derive(Clone, Debug)]
pub struct Initialised {
    patient_id: ShardedUuid,
}

/// Service for managing patient record operations.
///
/// Uses the type-state pattern to enforce correct usage at compile time: the
/// generic parameter `S` is either [`Uninitialised`] or [`Initialised`], and
/// operations that need an existing record are only available on the latter.
#[derive(Clone, Debug)]
pub struct PatientService<S> {
    cfg: Arc<CoreConfig>,
    state: S,
}

impl PatientService<Uninitialised> {
    /// Creates a new patient service in the uninitialised state.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self {
            cfg,
            state: Uninitialised,
        }
    }

    /// Initialises a new patient record.
    ///
    /// Creates a patient with a fresh UUID, writes the initial demographics
    /// YAML into a sharded directory, and initialises a Git repository for
    /// version control.
    ///
    /// **This method consumes `self`** and returns a
    /// `PatientService<Initialised>` on success, so `initialise()` cannot be
    /// called twice on the same service.
    ///
    /// # Arguments
    ///
    /// * `author` - Author information for the initial commit
    /// * `care_location` - Organisational location for the commit (clinic name)
    ///
    /// # Errors
    ///
    /// Returns `RecordError` if:
    /// - YAML serialisation of the record fails
    /// - The patient directory cannot be created
    /// - Git initialisation or the initial commit fails
    /// - Cleanup of a partially-created directory fails
    ///   ([`RecordError::CleanupAfterInitialiseFailed`])
    ///
    /// On failure the partially-created patient directory is removed.
    pub fn initialise(
        self,
        author: Author,
        care_location: NonEmptyText,
    ) -> RecordResult<PatientService<Initialised>> {
        author.validate_commit_author()?;

        let commit_message = CommitMessage::new(
            CommitDomain::Patient,
            CommitAction::Create,
            "Patient record created",
            care_location,
        )?;

        let patients_dir = self.cfg.patients_dir();
        let (patient_uuid, patient_dir) =
            create_uuid_and_shard_dir(&patients_dir, ShardedUuid::new)?;

        let record = PatientRecord {
            id: patient_uuid.clone(),
            given_names: vec![],
            family_name: None,
            birth_date: None,
            phone: None,
            created_at: Utc::now(),
            last_updated: None,
        };

        let record_yaml = serde_yaml::to_string(&record).map_err(RecordError::YamlSerialization)?;

        let result = VersionedFileService::init_and_commit(
            &patient_dir,
            &author,
            &commit_message,
            &[
                FileToWrite {
                    relative_path: Path::new(".gitignore"),
                    content: DEFAULT_GITIGNORE,
                    old_content: None,
                },
                FileToWrite {
                    relative_path: Path::new(PATIENT_FILE_NAME),
                    content: &record_yaml,
                    old_content: None,
                },
            ],
        );

        result.map(|()| PatientService {
            cfg: self.cfg,
            state: Initialised {
                patient_id: patient_uuid,
            },
        })
    }
}

impl PatientService<Initialised> {
    /// Creates a patient service for an existing record.
    ///
    /// Does not validate that the record actually exists on disk; operations
    /// on a missing record fail at runtime with
    /// [`RecordError::PatientNotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Uuid`] if `patient_id` is not a canonical UUID.
    pub fn with_id(cfg: Arc<CoreConfig>, patient_id: &str) -> RecordResult<Self> {
        let patient_uuid = ShardedUuid::parse(patient_id)?;
        Ok(Self {
            cfg,
            state: Initialised {
                patient_id: patient_uuid,
            },
        })
    }

    /// Returns the patient UUID.
    pub fn patient_id(&self) -> &ShardedUuid {
        &self.state.patient_id
    }

    /// Returns the patient's record directory.
    pub fn patient_dir(&self) -> PathBuf {
        self.state.patient_id.sharded_dir(&self.cfg.patients_dir())
    }

    /// Reads the patient's demographics file.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::PatientNotFound`] if the record does not exist
    /// and [`RecordError::YamlDeserialization`] if the file cannot be parsed.
    pub fn record(&self) -> RecordResult<PatientRecord> {
        let filename = self.patient_dir().join(PATIENT_FILE_NAME);
        if !filename.is_file() {
            return Err(RecordError::PatientNotFound(
                self.state.patient_id.to_string(),
            ));
        }

        let contents = fs::read_to_string(&filename).map_err(RecordError::FileRead)?;
        serde_yaml::from_str(&contents).map_err(RecordError::YamlDeserialization)
    }

    /// Updates the demographics of an existing patient.
    ///
    /// Reads the record, replaces name, birth date, and phone, and commits the
    /// change so the previous state stays in history.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` if the record is missing, cannot be parsed, or
    /// the commit fails.
    pub fn update(
        &self,
        author: &Author,
        care_location: NonEmptyText,
        given_names: Vec<String>,
        family_name: &str,
        birth_date: Option<String>,
        phone: Option<PhoneNumber>,
    ) -> RecordResult<()> {
        let patient_dir = self.patient_dir();
        let filename = patient_dir.join(PATIENT_FILE_NAME);
        if !filename.is_file() {
            return Err(RecordError::PatientNotFound(
                self.state.patient_id.to_string(),
            ));
        }

        let existing_yaml = fs::read_to_string(&filename).map_err(RecordError::FileRead)?;
        let mut record: PatientRecord =
            serde_yaml::from_str(&existing_yaml).map_err(RecordError::YamlDeserialization)?;

        record.given_names = given_names;
        record.family_name = Some(family_name.to_string());
        record.birth_date = birth_date;
        record.phone = phone;
        record.last_updated = Some(Utc::now());

        let updated_yaml = serde_yaml::to_string(&record).map_err(RecordError::YamlSerialization)?;

        let commit_message = CommitMessage::new(
            CommitDomain::Patient,
            CommitAction::Update,
            "Patient demographics updated",
            care_location,
        )?;

        VersionedFileService::write_and_commit_files(
            &patient_dir,
            author,
            &commit_message,
            &[FileToWrite {
                relative_path: Path::new(PATIENT_FILE_NAME),
                content: &updated_yaml,
                old_content: Some(&existing_yaml),
            }],
        )
    }
}

impl<S> PatientService<S> {
    /// Lists all patient records.
    ///
    /// Traverses the sharded directory structure under `patients/` and reads
    /// every `patient.yaml`. Individual files that cannot be parsed are logged
    /// as warnings and skipped; a missing `patients/` directory yields an
    /// empty list.
    pub fn list_patients(&self) -> Vec<PatientRecord> {
        let patients_dir = self.cfg.patients_dir();

        let mut patients = Vec::new();

        let s1_iter = match fs::read_dir(&patients_dir) {
            Ok(it) => it,
            Err(_) => return patients,
        };
        for s1 in s1_iter.flatten() {
            let s1_path = s1.path();
            if !s1_path.is_dir() {
                continue;
            }

            let s2_iter = match fs::read_dir(&s1_path) {
                Ok(it) => it,
                Err(_) => continue,
            };

            for s2 in s2_iter.flatten() {
                let s2_path = s2.path();
                if !s2_path.is_dir() {
                    continue;
                }

                let id_iter = match fs::read_dir(&s2_path) {
                    Ok(it) => it,
                    Err(_) => continue,
                };

                for id_ent in id_iter.flatten() {
                    let id_path = id_ent.path();
                    if !id_path.is_dir() {
                        continue;
                    }

                    let record_path = id_path.join(PATIENT_FILE_NAME);
                    if !record_path.is_file() {
                        continue;
                    }

                    match fs::read_to_string(&record_path) {
                        Ok(contents) => match serde_yaml::from_str::<PatientRecord>(&contents) {
                            Ok(record) => patients.push(record),
                            Err(e) => {
                                tracing::warn!(
                                    "failed to parse patient.yaml: {} - {}",
                                    record_path.display(),
                                    e
                                );
                            }
                        },
                        Err(e) => {
                            tracing::warn!(
                                "failed to read patient.yaml: {} - {}",
                                record_path.display(),
                                e
                            );
                        }
                    }
                }
            }
        }

        patients
    }
}
