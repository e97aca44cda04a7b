//! The clinic appointment book.
//!
//! Unlike patient records, appointments live in a single shared repository:
//! `clinic_data/appointment_book/`, one JSON file per appointment named by its
//! UUID, versioned as one Git history. Reminder delivery records are written
//! into `reminder_log/` inside the same repository, one file per
//! `(appointment, reminder kind)` pair - the existence of that file is the
//! dedup check reminder dispatch relies on.
//!
//! The book is small (a clinic's forward schedule), so scans read every
//! appointment file; there is no index.

use crate::author::Author;
use crate::config::CoreConfig;
use crate::constants::{DEFAULT_GITIGNORE, REMINDER_LOG_DIR_NAME};
use crate::error::{RecordError, RecordResult};
use crate::reminders::{ReminderKind, ReminderRecord};
use crate::versioned_files::{CommitAction, CommitDomain, CommitMessage, FileToWrite, VersionedFileService};
use chrono::{DateTime, Utc};
use dcr_types::NonEmptyText;
use dcr_uuid::ShardedUuid;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Lifecycle state of an appointment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

/// One booked appointment.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Appointment {
    pub id: ShardedUuid,
    pub patient_id: ShardedUuid,
    pub starts_at: DateTime<Utc>,
    #[serde(default)]
    pub reason: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

/// Service for the shared appointment book.
#[derive(Clone, Debug)]
pub struct AppointmentService {
    cfg: Arc<CoreConfig>,
}

impl AppointmentService {
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        Self { cfg }
    }

    fn book_dir(&self) -> PathBuf {
        self.cfg.appointment_book_dir()
    }

    fn appointment_path(&self, id: &ShardedUuid) -> PathBuf {
        self.book_dir().join(format!("{}.json", id))
    }

    fn reminder_path(&self, appointment_id: &ShardedUuid, kind: ReminderKind) -> PathBuf {
        self.book_dir()
            .join(REMINDER_LOG_DIR_NAME)
            .join(format!("{}.{}.json", appointment_id, kind.as_str()))
    }

    /// Initialises the appointment book repository if it does not exist yet.
    fn ensure_book(&self, author: &Author, care_location: &NonEmptyText) -> RecordResult<()> {
        let book_dir = self.book_dir();
        if book_dir.join(".git").is_dir() {
            return Ok(());
        }

        fs::create_dir_all(&book_dir).map_err(RecordError::StorageDirCreation)?;

        let commit_message = CommitMessage::new(
            CommitDomain::Appointment,
            CommitAction::Create,
            "Appointment book created",
            care_location.as_str(),
        )?;

        VersionedFileService::init_and_commit(
            &book_dir,
            author,
            &commit_message,
            &[FileToWrite {
                relative_path: Path::new(".gitignore"),
                content: DEFAULT_GITIGNORE,
                old_content: None,
            }],
        )
    }

    /// Books a new appointment for an existing patient.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::PatientNotFound`] if the patient record does not
    /// exist, and `RecordError` variants for serialisation or commit failures.
    pub fn book(
        &self,
        author: &Author,
        care_location: NonEmptyText,
        patient_id: &ShardedUuid,
        starts_at: DateTime<Utc>,
        reason: Option<String>,
    ) -> RecordResult<Appointment> {
        author.validate_commit_author()?;

        let patient_dir = patient_id.sharded_dir(&self.cfg.patients_dir());
        if !patient_dir.is_dir() {
            return Err(RecordError::PatientNotFound(patient_id.to_string()));
        }

        self.ensure_book(author, &care_location)?;

        let appointment = Appointment {
            id: ShardedUuid::new(),
            patient_id: patient_id.clone(),
            starts_at,
            reason: reason.filter(|r| !r.trim().is_empty()),
            status: AppointmentStatus::Scheduled,
            created_at: Utc::now(),
        };

        let contents =
            serde_json::to_string_pretty(&appointment).map_err(RecordError::Serialization)?;

        let commit_message = CommitMessage::new(
            CommitDomain::Appointment,
            CommitAction::Create,
            "Appointment booked",
            care_location,
        )?;

        let filename = format!("{}.json", appointment.id);
        VersionedFileService::write_and_commit_files(
            &self.book_dir(),
            author,
            &commit_message,
            &[FileToWrite {
                relative_path: Path::new(&filename),
                content: &contents,
                old_content: None,
            }],
        )?;

        Ok(appointment)
    }

    /// Reads one appointment by id.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::AppointmentNotFound`] if no such appointment
    /// exists.
    pub fn appointment(&self, id: &str) -> RecordResult<Appointment> {
        let id = ShardedUuid::parse(id)?;
        let path = self.appointment_path(&id);
        if !path.is_file() {
            return Err(RecordError::AppointmentNotFound(id.to_string()));
        }

        let contents = fs::read_to_string(&path).map_err(RecordError::FileRead)?;
        serde_json::from_str(&contents).map_err(RecordError::Deserialization)
    }

    /// Cancels a scheduled appointment.
    ///
    /// Cancelling an already-cancelled appointment is a no-op. The previous
    /// state stays in the book's history.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::AppointmentNotFound`] if no such appointment
    /// exists.
    pub fn cancel(
        &self,
        author: &Author,
        care_location: NonEmptyText,
        id: &str,
    ) -> RecordResult<Appointment> {
        let mut appointment = self.appointment(id)?;
        if appointment.status == AppointmentStatus::Cancelled {
            return Ok(appointment);
        }

        let path = self.appointment_path(&appointment.id);
        let old_contents = fs::read_to_string(&path).map_err(RecordError::FileRead)?;

        appointment.status = AppointmentStatus::Cancelled;
        let contents =
            serde_json::to_string_pretty(&appointment).map_err(RecordError::Serialization)?;

        let commit_message = CommitMessage::new(
            CommitDomain::Appointment,
            CommitAction::Update,
            "Appointment cancelled",
            care_location,
        )?;

        let filename = format!("{}.json", appointment.id);
        VersionedFileService::write_and_commit_files(
            &self.book_dir(),
            author,
            &commit_message,
            &[FileToWrite {
                relative_path: Path::new(&filename),
                content: &contents,
                old_content: Some(&old_contents),
            }],
        )?;

        Ok(appointment)
    }

    /// Lists every appointment in the book, unordered.
    ///
    /// Files that cannot be parsed are logged as warnings and skipped; a
    /// missing book yields an empty list.
    pub fn list_all(&self) -> Vec<Appointment> {
        let book_dir = self.book_dir();
        let entries = match fs::read_dir(&book_dir) {
            Ok(it) => it,
            Err(_) => return Vec::new(),
        };

        let mut appointments = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match fs::read_to_string(&path) {
                Ok(contents) => match serde_json::from_str::<Appointment>(&contents) {
                    Ok(appointment) => appointments.push(appointment),
                    Err(e) => {
                        tracing::warn!("failed to parse appointment: {} - {}", path.display(), e);
                    }
                },
                Err(e) => {
                    tracing::warn!("failed to read appointment: {} - {}", path.display(), e);
                }
            }
        }

        appointments
    }

    /// Scheduled appointments whose start time falls in `[from, to)`,
    /// ascending by start time.
    pub fn scheduled_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Vec<Appointment> {
        let mut matches: Vec<Appointment> = self
            .list_all()
            .into_iter()
            .filter(|a| {
                a.status == AppointmentStatus::Scheduled && a.starts_at >= from && a.starts_at < to
            })
            .collect();
        matches.sort_by_key(|a| a.starts_at);
        matches
    }

    /// Whether a reminder of `kind` has already been logged for the
    /// appointment.
    ///
    /// This is a plain file-existence check with no transactional guard; see
    /// the reminder dispatch module for the consequences.
    pub fn reminder_sent(&self, appointment_id: &ShardedUuid, kind: ReminderKind) -> bool {
        self.reminder_path(appointment_id, kind).is_file()
    }

    /// Persists a reminder delivery record.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` variants for serialisation or commit failures.
    pub fn record_reminder(
        &self,
        author: &Author,
        care_location: NonEmptyText,
        record: &ReminderRecord,
    ) -> RecordResult<()> {
        let contents = serde_json::to_string_pretty(record).map_err(RecordError::Serialization)?;

        let commit_message = CommitMessage::new(
            CommitDomain::Reminder,
            CommitAction::Create,
            "Reminder delivery logged",
            care_location,
        )?
        .with_trailer("Reminder-Kind", record.kind.as_str())?;

        let relative_path = PathBuf::from(REMINDER_LOG_DIR_NAME).join(format!(
            "{}.{}.json",
            record.appointment_id,
            record.kind.as_str()
        ));

        VersionedFileService::write_and_commit_files(
            &self.book_dir(),
            author,
            &commit_message,
            &[FileToWrite {
                relative_path: &relative_path,
                content: &contents,
                old_content: None,
            }],
        )
    }

    /// All logged reminder deliveries for one appointment.
    pub fn reminders_for(&self, appointment_id: &ShardedUuid) -> Vec<ReminderRecord> {
        let log_dir = self.book_dir().join(REMINDER_LOG_DIR_NAME);
        let entries = match fs::read_dir(&log_dir) {
            Ok(it) => it,
            Err(_) => return Vec::new(),
        };

        let prefix = format!("{}.", appointment_id);
        let mut records = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.starts_with(&prefix) {
                continue;
            }

            match fs::read_to_string(&path) {
                Ok(contents) => match serde_json::from_str::<ReminderRecord>(&contents) {
                    Ok(record) => records.push(record),
                    Err(e) => {
                        tracing::warn!(
                            "failed to parse reminder record: {} - {}",
                            path.display(),
                            e
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!("failed to read reminder record: {} - {}", path.display(), e);
                }
            }
        }

        records
    }
}
