//! # DCR Core
//!
//! Core business logic for the DCR dental clinic record system.
//!
//! This crate contains pure data operations and file/folder management:
//! - The odontogram domain model: tooth universe, condition vocabulary,
//!   chart snapshots, and the pure diff engine
//! - Patient record creation, update, and listing with sharded storage
//! - Immutable odontogram version storage and history per patient
//! - The appointment book and window-based reminder dispatch
//! - Git-based versioning of every record directory
//!
//! **No API concerns**: HTTP servers, OpenAPI documentation, and CLI surfaces
//! belong in `api-rest` and `dcr-cli`. Services here take their dependencies
//! explicitly - configuration arrives as `Arc<CoreConfig>`, never through a
//! process-global handle - so tests and alternative frontends can substitute
//! their own.

pub mod author;
pub mod config;
pub mod constants;
pub mod error;
pub mod odontogram;
pub mod reminders;
pub mod repositories;
pub(crate) mod versioned_files;

pub use author::{Author, AuthorRegistration};
pub use config::CoreConfig;
pub use constants::DEFAULT_CLINIC_DATA_DIR;
pub use error::{RecordError, RecordResult};
pub use odontogram::{diff_charts, ChartChange, Condition, ToothChart, ToothId, ToothState};
pub use reminders::{
    DeliveryOutcome, MessageSendError, MessageSender, PollSummary, ReminderDispatcher,
    ReminderKind, ReminderRecord, TracingSender,
};
pub use repositories::appointments::{Appointment, AppointmentService, AppointmentStatus};
pub use repositories::odontogram::{OdontogramService, OdontogramVersion, Timeline, VersionKind};
pub use repositories::patients::{PatientRecord, PatientService, Uninitialised};

// Validated primitives and identifiers are part of the public vocabulary.
pub use dcr_types::{NonEmptyText, PhoneNumber};
pub use dcr_uuid::{ShardedUuid, VersionId};
