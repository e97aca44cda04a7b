//! Odontogram version storage and history.
//!
//! Every saved tooth chart becomes an immutable, timestamped *version* owned
//! by its patient. Versions are never mutated or deleted in normal flow: each
//! one is a JSON file named by its [`VersionId`] under `odontogram/` in the
//! patient's record directory, committed to the patient's Git repository at
//! creation time. Because version ids sort lexicographically by creation
//! time, the directory listing *is* the patient's timeline, and any two
//! versions can be compared regardless of adjacency - no version references
//! another.
//!
//! Two record kinds exist: `diagnostico` (the initial charting) and
//! `evolucion` (a follow-up). By convention a patient's earliest version is a
//! `diagnostico`, but this is not enforced on write; the timeline exposes the
//! counts for display layers that want to flag the exception.
//!
//! A version may carry free-text clinical notes and an opaque reference to a
//! rendered raster image of the chart. The image bytes themselves live in the
//! patient's content-addressed `files/` area (see [`dcr_files`]) and never in
//! the version record.

use crate::author::Author;
use crate::config::CoreConfig;
use crate::constants::ODONTOGRAM_DIR_NAME;
use crate::error::{RecordError, RecordResult};
use crate::odontogram::ToothChart;
use crate::versioned_files::{CommitAction, CommitDomain, CommitMessage, FileToWrite, VersionedFileService};
use chrono::{DateTime, Utc};
use dcr_files::{ImageMetadata, ImageStore};
use dcr_types::NonEmptyText;
use dcr_uuid::{ShardedUuid, VersionId};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// The kind of an odontogram version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionKind {
    /// Baseline/initial charting.
    Diagnostico,
    /// Follow-up charting.
    Evolucion,
}

impl VersionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Diagnostico => "diagnostico",
            Self::Evolucion => "evolucion",
        }
    }
}

impl FromStr for VersionKind {
    type Err = RecordError;

    fn from_str(s: &str) -> RecordResult<Self> {
        match s {
            "diagnostico" => Ok(Self::Diagnostico),
            "evolucion" => Ok(Self::Evolucion),
            other => Err(RecordError::InvalidInput(format!(
                "unknown version kind: '{}' (expected 'diagnostico' or 'evolucion')",
                other
            ))),
        }
    }
}

impl std::fmt::Display for VersionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable odontogram version.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OdontogramVersion {
    pub id: VersionId,
    pub patient_id: ShardedUuid,
    pub kind: VersionKind,
    /// Server-assigned creation time; equals the timestamp component of `id`.
    pub recorded_at: DateTime<Utc>,
    pub chart: ToothChart,
    #[serde(default)]
    pub notes: Option<String>,
    /// Opaque reference to a rendered raster image of this chart, typically
    /// the SHA-256 address returned by [`OdontogramService::attach_image`].
    #[serde(default)]
    pub image_ref: Option<String>,
}

/// A patient's version history with its kind breakdown.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Timeline {
    /// All versions, newest first.
    pub versions: Vec<OdontogramVersion>,
    pub diagnostico_count: usize,
    pub evolucion_count: usize,
}

/// Service for managing one patient's odontogram versions.
///
/// Construction performs no I/O; each operation checks that the patient
/// record exists and fails with [`RecordError::PatientNotFound`] otherwise.
#[derive(Clone, Debug)]
pub struct OdontogramService {
    cfg: Arc<CoreConfig>,
    patient_id: ShardedUuid,
}

impl OdontogramService {
    /// Creates a service bound to one patient.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::Uuid`] if `patient_id` is not a canonical UUID.
    pub fn for_patient(cfg: Arc<CoreConfig>, patient_id: &str) -> RecordResult<Self> {
        let patient_id = ShardedUuid::parse(patient_id)?;
        Ok(Self { cfg, patient_id })
    }

    /// Returns the patient UUID this service operates on.
    pub fn patient_id(&self) -> &ShardedUuid {
        &self.patient_id
    }

    fn patient_dir(&self) -> PathBuf {
        self.patient_id.sharded_dir(&self.cfg.patients_dir())
    }

    fn odontogram_dir(&self) -> PathBuf {
        self.patient_dir().join(ODONTOGRAM_DIR_NAME)
    }

    fn ensure_patient_exists(&self) -> RecordResult<PathBuf> {
        let patient_dir = self.patient_dir();
        if !patient_dir.is_dir() {
            return Err(RecordError::PatientNotFound(self.patient_id.to_string()));
        }
        Ok(patient_dir)
    }

    /// Creates a new immutable version from the given chart.
    ///
    /// The version id's timestamp is strictly greater than every previously
    /// issued id for this patient, so listing order is stable even when the
    /// wall clock stands still between saves.
    ///
    /// # Arguments
    ///
    /// * `author` - Author information for the commit
    /// * `care_location` - Organisational location for the commit
    /// * `kind` - `diagnostico` or `evolucion`
    /// * `chart` - The tooth chart snapshot to freeze
    /// * `notes` - Optional free-text clinical notes
    /// * `image_ref` - Optional opaque reference to a rendered chart image
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::PatientNotFound`] if the patient record does not
    /// exist, and `RecordError` variants for serialisation or commit failures.
    pub fn create_version(
        &self,
        author: &Author,
        care_location: NonEmptyText,
        kind: VersionKind,
        chart: ToothChart,
        notes: Option<String>,
        image_ref: Option<String>,
    ) -> RecordResult<OdontogramVersion> {
        author.validate_commit_author()?;
        let patient_dir = self.ensure_patient_exists()?;

        let newest = self.newest_version_id()?;
        let id = VersionId::generate(newest.as_ref());

        let version = OdontogramVersion {
            recorded_at: id.timestamp(),
            id,
            patient_id: self.patient_id.clone(),
            kind,
            chart,
            notes: notes.filter(|n| !n.trim().is_empty()),
            image_ref,
        };

        let contents =
            serde_json::to_string_pretty(&version).map_err(RecordError::Serialization)?;

        let commit_message = CommitMessage::new(
            CommitDomain::Odontogram,
            CommitAction::Create,
            "Odontogram version recorded",
            care_location,
        )?
        .with_trailer("Version-Kind", kind.as_str())?;

        let relative_path = PathBuf::from(ODONTOGRAM_DIR_NAME).join(format!("{}.json", version.id));

        VersionedFileService::write_and_commit_files(
            &patient_dir,
            author,
            &commit_message,
            &[FileToWrite {
                relative_path: &relative_path,
                content: &contents,
                old_content: None,
            }],
        )?;

        Ok(version)
    }

    /// Reads one version by id.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::VersionNotFound`] if no version with that id
    /// exists for this patient, [`RecordError::InvalidInput`] (via the id
    /// parse) for a malformed id.
    pub fn version(&self, id: &str) -> RecordResult<OdontogramVersion> {
        self.ensure_patient_exists()?;

        let id = VersionId::from_str(id)
            .map_err(|e| RecordError::InvalidInput(format!("invalid version id: {}", e)))?;

        let path = self.odontogram_dir().join(format!("{}.json", id));
        if !path.is_file() {
            return Err(RecordError::VersionNotFound(id.to_string()));
        }

        let contents = fs::read_to_string(&path).map_err(RecordError::FileRead)?;
        serde_json::from_str(&contents).map_err(RecordError::Deserialization)
    }

    /// Lists every version for this patient, newest first.
    ///
    /// An empty list (not an error) is returned for a patient who has no
    /// versions yet. Files that cannot be parsed are logged as warnings and
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::PatientNotFound`] if the patient record does not
    /// exist.
    pub fn list_versions(&self) -> RecordResult<Vec<OdontogramVersion>> {
        self.ensure_patient_exists()?;

        let odontogram_dir = self.odontogram_dir();
        let entries = match fs::read_dir(&odontogram_dir) {
            Ok(it) => it,
            Err(_) => return Ok(Vec::new()),
        };

        let mut versions = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }

            match fs::read_to_string(&path) {
                Ok(contents) => match serde_json::from_str::<OdontogramVersion>(&contents) {
                    Ok(version) => versions.push(version),
                    Err(e) => {
                        tracing::warn!(
                            "failed to parse odontogram version: {} - {}",
                            path.display(),
                            e
                        );
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        "failed to read odontogram version: {} - {}",
                        path.display(),
                        e
                    );
                }
            }
        }

        versions.sort_by(|a, b| b.id.to_string().cmp(&a.id.to_string()));
        Ok(versions)
    }

    /// The patient's timeline: all versions newest first, partitioned into
    /// kind counts for summary display.
    pub fn timeline(&self) -> RecordResult<Timeline> {
        let versions = self.list_versions()?;
        let diagnostico_count = versions
            .iter()
            .filter(|v| v.kind == VersionKind::Diagnostico)
            .count();
        let evolucion_count = versions.len() - diagnostico_count;

        Ok(Timeline {
            versions,
            diagnostico_count,
            evolucion_count,
        })
    }

    /// The single most recent version, or `None` for a patient with no
    /// versions yet.
    ///
    /// This is the seed state offered when starting a new `evolucion` entry:
    /// the editor is pre-populated with this baseline's chart so the clinician
    /// edits deltas rather than re-entering all 32 teeth.
    pub fn current_baseline(&self) -> RecordResult<Option<OdontogramVersion>> {
        Ok(self.list_versions()?.into_iter().next())
    }

    /// Stores rendered chart image bytes in the patient's content-addressed
    /// `files/` area and returns the metadata whose hash string is used as a
    /// version's `image_ref`.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::PatientNotFound`] if the patient record does not
    /// exist and [`RecordError::Files`] for storage failures.
    pub fn attach_image(
        &self,
        bytes: &[u8],
        original_filename: &NonEmptyText,
    ) -> RecordResult<ImageMetadata> {
        self.ensure_patient_exists()?;
        let store = ImageStore::new(&self.cfg.patients_dir(), &self.patient_id)?;
        Ok(store.add_bytes(bytes, original_filename)?)
    }

    /// Reads previously stored image bytes by their content address.
    pub fn image(&self, hash: &str) -> RecordResult<Vec<u8>> {
        self.ensure_patient_exists()?;
        let store = ImageStore::new(&self.cfg.patients_dir(), &self.patient_id)?;
        Ok(store.read(hash)?)
    }

    fn newest_version_id(&self) -> RecordResult<Option<VersionId>> {
        let odontogram_dir = self.odontogram_dir();
        let entries = match fs::read_dir(&odontogram_dir) {
            Ok(it) => it,
            Err(_) => return Ok(None),
        };

        let mut newest: Option<VersionId> = None;
        for entry in entries.flatten() {
            let path = entry.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Ok(id) = VersionId::from_str(stem) else {
                continue;
            };
            if newest
                .as_ref()
                .map(|n| id.timestamp() > n.timestamp())
                .unwrap_or(true)
            {
                newest = Some(id);
            }
        }
        Ok(newest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odontogram::{diff_charts, Condition, ToothId};
    use crate::repositories::patients::PatientService;
    use tempfile::TempDir;

    fn test_author() -> Author {
        Author {
            name: NonEmptyText::new("Test Author").unwrap(),
            role: NonEmptyText::new("Dentist").unwrap(),
            email: NonEmptyText::new("test@example.com").unwrap(),
            registrations: vec![],
        }
    }

    fn test_cfg(clinic_data_dir: &std::path::Path) -> Arc<CoreConfig> {
        Arc::new(
            CoreConfig::new(
                clinic_data_dir.to_path_buf(),
                NonEmptyText::new("Clinica Dental Sol").unwrap(),
            )
            .unwrap(),
        )
    }

    fn care_location() -> NonEmptyText {
        NonEmptyText::new("Clinica Dental Sol").unwrap()
    }

    fn chart(entries: &[(ToothId, Condition)]) -> ToothChart {
        entries.iter().copied().collect()
    }

    fn setup_patient(cfg: Arc<CoreConfig>) -> OdontogramService {
        let patient = PatientService::new(cfg.clone())
            .initialise(test_author(), care_location())
            .unwrap();
        OdontogramService::for_patient(cfg, &patient.patient_id().to_string()).unwrap()
    }

    #[test]
    fn create_version_persists_an_immutable_record() {
        let temp = TempDir::new().unwrap();
        let cfg = test_cfg(temp.path());
        let service = setup_patient(cfg);

        let created = service
            .create_version(
                &test_author(),
                care_location(),
                VersionKind::Diagnostico,
                chart(&[(ToothId::T11, Condition::Caries)]),
                Some("primera revision".to_string()),
                None,
            )
            .unwrap();

        let read_back = service.version(&created.id.to_string()).unwrap();
        assert_eq!(read_back, created);
        assert_eq!(read_back.kind, VersionKind::Diagnostico);
        assert_eq!(read_back.recorded_at, created.id.timestamp());
        assert_eq!(read_back.notes.as_deref(), Some("primera revision"));
    }

    #[test]
    fn create_version_requires_existing_patient() {
        let temp = TempDir::new().unwrap();
        let cfg = test_cfg(temp.path());

        let service =
            OdontogramService::for_patient(cfg, &ShardedUuid::new().to_string()).unwrap();
        let err = service
            .create_version(
                &test_author(),
                care_location(),
                VersionKind::Diagnostico,
                ToothChart::new(),
                None,
                None,
            )
            .unwrap_err();
        assert!(matches!(err, RecordError::PatientNotFound(_)));
    }

    #[test]
    fn version_ids_are_strictly_increasing_per_patient() {
        let temp = TempDir::new().unwrap();
        let cfg = test_cfg(temp.path());
        let service = setup_patient(cfg);

        let mut previous: Option<VersionId> = None;
        for _ in 0..3 {
            let version = service
                .create_version(
                    &test_author(),
                    care_location(),
                    VersionKind::Evolucion,
                    ToothChart::new(),
                    None,
                    None,
                )
                .unwrap();
            if let Some(prev) = previous {
                assert!(version.id.timestamp() > prev.timestamp());
            }
            previous = Some(version.id);
        }
    }

    #[test]
    fn list_versions_is_newest_first() {
        let temp = TempDir::new().unwrap();
        let cfg = test_cfg(temp.path());
        let service = setup_patient(cfg);

        let first = service
            .create_version(
                &test_author(),
                care_location(),
                VersionKind::Diagnostico,
                chart(&[(ToothId::T11, Condition::Caries)]),
                None,
                None,
            )
            .unwrap();
        let second = service
            .create_version(
                &test_author(),
                care_location(),
                VersionKind::Evolucion,
                chart(&[(ToothId::T11, Condition::FilledSound)]),
                None,
                None,
            )
            .unwrap();

        let versions = service.list_versions().unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].id, second.id);
        assert_eq!(versions[1].id, first.id);
    }

    #[test]
    fn timeline_partitions_kind_counts() {
        let temp = TempDir::new().unwrap();
        let cfg = test_cfg(temp.path());
        let service = setup_patient(cfg);

        for kind in [
            VersionKind::Diagnostico,
            VersionKind::Evolucion,
            VersionKind::Evolucion,
        ] {
            service
                .create_version(
                    &test_author(),
                    care_location(),
                    kind,
                    ToothChart::new(),
                    None,
                    None,
                )
                .unwrap();
        }

        let timeline = service.timeline().unwrap();
        assert_eq!(timeline.versions.len(), 3);
        assert_eq!(timeline.diagnostico_count, 1);
        assert_eq!(timeline.evolucion_count, 2);
    }

    #[test]
    fn current_baseline_is_none_without_versions() {
        let temp = TempDir::new().unwrap();
        let cfg = test_cfg(temp.path());
        let service = setup_patient(cfg);

        assert_eq!(service.current_baseline().unwrap(), None);
    }

    #[test]
    fn current_baseline_is_the_most_recent_version() {
        let temp = TempDir::new().unwrap();
        let cfg = test_cfg(temp.path());
        let service = setup_patient(cfg);

        service
            .create_version(
                &test_author(),
                care_location(),
                VersionKind::Diagnostico,
                chart(&[(ToothId::T11, Condition::Caries)]),
                None,
                None,
            )
            .unwrap();
        let newest = service
            .create_version(
                &test_author(),
                care_location(),
                VersionKind::Evolucion,
                chart(&[(ToothId::T11, Condition::FilledSound)]),
                None,
                None,
            )
            .unwrap();

        let baseline = service.current_baseline().unwrap().unwrap();
        assert_eq!(baseline.id, newest.id);
    }

    #[test]
    fn stored_versions_diff_like_their_charts() {
        let temp = TempDir::new().unwrap();
        let cfg = test_cfg(temp.path());
        let service = setup_patient(cfg);

        let a = service
            .create_version(
                &test_author(),
                care_location(),
                VersionKind::Diagnostico,
                chart(&[(ToothId::T21, Condition::Healthy)]),
                None,
                None,
            )
            .unwrap();
        let b = service
            .create_version(
                &test_author(),
                care_location(),
                VersionKind::Evolucion,
                chart(&[(ToothId::T21, Condition::FilledWithCaries)]),
                None,
                None,
            )
            .unwrap();

        let a = service.version(&a.id.to_string()).unwrap();
        let b = service.version(&b.id.to_string()).unwrap();

        let changes = diff_charts(&a.chart, &b.chart);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].tooth, ToothId::T21);
        assert_eq!(changes[0].from.as_deref(), Some("0"));
        assert_eq!(changes[0].to.as_deref(), Some("2"));
    }

    #[test]
    fn unknown_version_id_is_not_found() {
        let temp = TempDir::new().unwrap();
        let cfg = test_cfg(temp.path());
        let service = setup_patient(cfg);

        let missing = VersionId::generate(None);
        let err = service.version(&missing.to_string()).unwrap_err();
        assert!(matches!(err, RecordError::VersionNotFound(_)));
    }

    #[test]
    fn malformed_version_id_is_invalid_input() {
        let temp = TempDir::new().unwrap();
        let cfg = test_cfg(temp.path());
        let service = setup_patient(cfg);

        let err = service.version("not-a-version-id").unwrap_err();
        assert!(matches!(err, RecordError::InvalidInput(_)));
    }

    #[test]
    fn attach_image_yields_a_usable_image_ref() {
        let temp = TempDir::new().unwrap();
        let cfg = test_cfg(temp.path());
        let service = setup_patient(cfg);

        let bytes = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let metadata = service
            .attach_image(&bytes, &NonEmptyText::new("chart.png").unwrap())
            .unwrap();

        let version = service
            .create_version(
                &test_author(),
                care_location(),
                VersionKind::Diagnostico,
                ToothChart::new(),
                None,
                Some(metadata.hash.to_string()),
            )
            .unwrap();

        assert_eq!(version.image_ref.as_deref(), Some(metadata.hash.as_str()));
        assert_eq!(service.image(metadata.hash.as_str()).unwrap(), bytes);
    }
}
