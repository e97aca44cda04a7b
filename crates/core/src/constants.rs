//! Constants used throughout the DCR core crate.
//!
//! Path and filename constants live here so every service derives the same
//! storage layout.

/// Directory name for patient records storage.
pub const PATIENTS_DIR_NAME: &str = "patients";

/// Directory name for the shared appointment book repository.
pub const APPOINTMENT_BOOK_DIR_NAME: &str = "appointment_book";

/// Directory name for reminder delivery records inside the appointment book.
pub const REMINDER_LOG_DIR_NAME: &str = "reminder_log";

/// Directory name for odontogram versions inside a patient directory.
pub const ODONTOGRAM_DIR_NAME: &str = "odontogram";

/// Filename for a patient's demographics file.
pub const PATIENT_FILE_NAME: &str = "patient.yaml";

/// Default directory for clinic data storage when none is configured.
pub const DEFAULT_CLINIC_DATA_DIR: &str = "clinic_data";

/// `.gitignore` content written into every record repository.
///
/// The `files/` area holds content-addressed binaries (rendered odontogram
/// images) which are deliberately kept out of version control.
pub const DEFAULT_GITIGNORE: &str = "files/\n";
