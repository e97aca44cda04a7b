//! Versioned file operations with Git-based version control.
//!
//! DCR stores clinic data as files on disk and versions each record directory using a
//! local Git repository (`git2`/libgit2). This module provides the high-level services
//! for managing those files, ensuring:
//!
//! - **Atomic Multi-file Operations**: Write multiple files and commit them in a single
//!   transaction with automatic rollback on failure
//! - **Consistent Commit Creation**: Structured commit messages with controlled vocabulary
//!   across all services (patients, odontogram, appointments, reminders)
//! - **Immutable Audit Trail**: Nothing is deleted in normal flow; every change to a
//!   clinical record is preserved in version control history
//!
//! ## Branch Policy
//!
//! DCR standardises on `refs/heads/main` for all record repositories.
//!
//! ## Commit Message Format
//!
//! - Subject line: `<domain>:<action>: <summary>`
//! - Trailers: standard Git trailer lines `Key: Value`, always including
//!   `Care-Location` and the `Author-*` identity trailers
//! - No free-form prose paragraphs
//!
//! Commit messages are labels and indexes; they must not include patient identifiers or
//! raw clinical data.

use crate::author::Author;
use crate::error::{RecordError, RecordResult};
use dcr_types::NonEmptyText;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

const MAIN_REF: &str = "refs/heads/main";

/// Controlled vocabulary for commit message domains.
///
/// One variant per record family the clinic maintains.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum CommitDomain {
    Patient,
    Odontogram,
    Appointment,
    Reminder,
}

impl CommitDomain {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Patient => "patient",
            Self::Odontogram => "odontogram",
            Self::Appointment => "appointment",
            Self::Reminder => "reminder",
        }
    }
}

impl fmt::Display for CommitDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Controlled vocabulary for commit message actions.
///
/// DCR keeps an immutable audit trail: `Create` adds new content, `Update`
/// modifies existing content with the previous state preserved in history.
/// There is no delete action; administrative removal is outside this layer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum CommitAction {
    Create,
    Update,
}

impl CommitAction {
    pub(crate) const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
        }
    }
}

impl fmt::Display for CommitAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single commit trailer line in standard Git trailer format.
///
/// Renders as `Key: Value`. Trailers carry structured metadata beyond the
/// subject line and are sorted deterministically in rendered output.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) struct CommitTrailer {
    key: String,
    value: String,
}

impl CommitTrailer {
    /// Create a new commit trailer with validation.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::InvalidInput` if the key contains ':' or either
    /// part is empty or multi-line.
    pub(crate) fn new(key: impl Into<String>, value: impl Into<String>) -> RecordResult<Self> {
        let key = key.into().trim().to_string();
        let value = value.into().trim().to_string();

        if key.is_empty()
            || key.contains(['\n', '\r'])
            || key.contains(':')
            || value.is_empty()
            || value.contains(['\n', '\r'])
        {
            return Err(RecordError::InvalidInput(
                "commit trailer key/value must be non-empty and single-line (key cannot contain ':')".into()
            ));
        }

        Ok(Self { key, value })
    }

    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn value(&self) -> &str {
        &self.value
    }
}

/// A structured, predictable DCR commit message.
///
/// Rendering rules:
///
/// - Subject line: `<domain>:<action>: <summary>`
/// - A blank line, then the `Author-*` trailers, `Care-Location`, and any
///   additional trailers in deterministic order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct CommitMessage {
    domain: CommitDomain,
    action: CommitAction,
    summary: NonEmptyText,
    care_location: NonEmptyText,
    trailers: Vec<CommitTrailer>,
}

impl CommitMessage {
    /// Create a new commit message with required fields.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::InvalidInput` if the summary is empty or multi-line,
    /// `RecordError::MissingCareLocation` / `RecordError::InvalidCareLocation` for a
    /// bad care location.
    pub(crate) fn new(
        domain: CommitDomain,
        action: CommitAction,
        summary: impl AsRef<str>,
        care_location: impl AsRef<str>,
    ) -> RecordResult<Self> {
        let summary_str = summary.as_ref().trim();
        if summary_str.contains(['\n', '\r']) {
            return Err(RecordError::InvalidInput(
                "commit summary must be single-line".into(),
            ));
        }
        let summary = NonEmptyText::new(summary_str)
            .map_err(|_| RecordError::InvalidInput("commit summary must be non-empty".into()))?;

        let care_location_str = care_location.as_ref().trim();
        if care_location_str.contains(['\n', '\r']) {
            return Err(RecordError::InvalidCareLocation);
        }
        let care_location =
            NonEmptyText::new(care_location_str).map_err(|_| RecordError::MissingCareLocation)?;

        Ok(Self {
            domain,
            action,
            summary,
            care_location,
            trailers: Vec::new(),
        })
    }

    /// Add a trailer to the commit message.
    ///
    /// `Author-*` and `Care-Location` keys are reserved; they are emitted from
    /// the structured metadata only.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::ReservedAuthorTrailerKey` /
    /// `RecordError::ReservedCareLocationTrailerKey` for reserved keys and
    /// `RecordError::InvalidInput` for malformed key/value pairs.
    pub(crate) fn with_trailer(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> RecordResult<Self> {
        let key_str = key.into();
        if key_str.trim_start().starts_with("Author-") {
            return Err(RecordError::ReservedAuthorTrailerKey);
        }
        if key_str.trim() == "Care-Location" {
            return Err(RecordError::ReservedCareLocationTrailerKey);
        }
        self.trailers.push(CommitTrailer::new(key_str, value.into())?);
        Ok(self)
    }

    /// Render a commit message including the mandatory Author trailers.
    ///
    /// The Author trailers are rendered deterministically in the order:
    ///
    /// - `Author-Name`
    /// - `Author-Role`
    /// - `Author-Registration` (0..N; sorted)
    ///
    /// followed by `Care-Location` and the remaining trailers in sorted order.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` from author validation.
    pub(crate) fn render_with_author(&self, author: &Author) -> RecordResult<String> {
        author.validate_commit_author()?;

        let mut rendered = format!("{}:{}: {}", self.domain, self.action, self.summary.as_str());

        let mut regs = author.registrations.clone();
        regs.sort_by(|a, b| {
            let a_key = (a.authority.as_str(), a.number.as_str());
            let b_key = (b.authority.as_str(), b.number.as_str());
            a_key.cmp(&b_key)
        });

        let mut other = self.trailers.clone();
        other.sort_by(|a, b| {
            let a_key = (a.key(), a.value());
            let b_key = (b.key(), b.value());
            a_key.cmp(&b_key)
        });

        rendered.push_str("\n\n");
        rendered.push_str("Author-Name: ");
        rendered.push_str(author.name.as_str());
        rendered.push('\n');
        rendered.push_str("Author-Role: ");
        rendered.push_str(author.role.as_str());

        for reg in regs {
            rendered.push('\n');
            rendered.push_str("Author-Registration: ");
            rendered.push_str(reg.authority.as_str());
            rendered.push(' ');
            rendered.push_str(reg.number.as_str());
        }

        rendered.push('\n');
        rendered.push_str("Care-Location: ");
        rendered.push_str(self.care_location.as_str());

        for trailer in other {
            rendered.push('\n');
            rendered.push_str(trailer.key());
            rendered.push_str(": ");
            rendered.push_str(trailer.value());
        }

        Ok(rendered)
    }
}

/// Represents a file to be written and committed.
///
/// Used with [`VersionedFileService::write_and_commit_files`] to write multiple
/// files in a single atomic commit operation.
#[derive(Debug, Clone)]
pub struct FileToWrite<'a> {
    /// The relative path to the file within the repository directory.
    pub relative_path: &'a Path,
    /// The new content to write to the file.
    pub content: &'a str,
    /// The previous file content for rollback. `None` if this is a new file.
    pub old_content: Option<&'a str>,
}

/// Service for managing versioned files with Git version control.
///
/// `VersionedFileService` provides the high-level write path for DCR's record
/// repositories: open or initialise the repository, write a set of files, and
/// commit them in a single commit with automatic rollback on failure.
pub struct VersionedFileService {
    repo: git2::Repository,
    workdir: PathBuf,
}

impl VersionedFileService {
    /// Create a new Git repository at the specified working directory.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::GitInit`] if initialisation fails or the
    /// repository has no working directory.
    pub(crate) fn init(workdir: &Path) -> RecordResult<Self> {
        let repo = git2::Repository::init(workdir).map_err(RecordError::GitInit)?;
        let actual_workdir = repo
            .workdir()
            .ok_or_else(|| {
                RecordError::GitInit(git2::Error::from_str("repository has no working directory"))
            })?
            .to_path_buf();
        Ok(Self {
            repo,
            workdir: actual_workdir,
        })
    }

    /// Open an existing Git repository at the specified working directory.
    ///
    /// Uses `NO_SEARCH` so git2 does not walk up parent directories: record
    /// repositories are nested under the clinic data directory and must stay
    /// isolated from each other.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::GitOpen`] if the repository does not exist,
    /// cannot be opened, or has no working directory.
    pub(crate) fn open(workdir: &Path) -> RecordResult<Self> {
        let repo = git2::Repository::open_ext(
            workdir,
            git2::RepositoryOpenFlags::NO_SEARCH,
            std::iter::empty::<&std::ffi::OsStr>(),
        )
        .map_err(RecordError::GitOpen)?;
        // git2 may resolve symlinks; use its view of the workdir so path
        // stripping works correctly.
        let actual_workdir = repo
            .workdir()
            .ok_or_else(|| {
                RecordError::GitOpen(git2::Error::from_str("repository has no working directory"))
            })?
            .to_path_buf();
        Ok(Self {
            repo,
            workdir: actual_workdir,
        })
    }

    /// Ensure `HEAD` points at `refs/heads/main`.
    ///
    /// For newly initialised repositories this creates an "unborn" `main`
    /// branch that is born with the first commit.
    fn ensure_main_head(&self) -> RecordResult<()> {
        self.repo
            .set_head(MAIN_REF)
            .map_err(RecordError::GitSetHead)?;
        Ok(())
    }

    /// Writes multiple files and commits them to Git with rollback on failure.
    ///
    /// Opens the repository at `repo_path`, creates any necessary parent
    /// directories, writes all files, and commits them in a single commit. On
    /// error:
    /// - Files that previously existed are restored to their previous state
    /// - New files are removed
    /// - Any directories created during this operation are removed
    ///
    /// # Errors
    ///
    /// Returns a `RecordError` if repository opening, directory creation, a
    /// file write, or the commit fails. On error, attempts to roll back all
    /// files and newly created directories.
    pub(crate) fn write_and_commit_files(
        repo_path: &Path,
        author: &Author,
        msg: &CommitMessage,
        files: &[FileToWrite<'_>],
    ) -> RecordResult<()> {
        let repo = Self::open(repo_path)?;

        let mut created_dirs: Vec<PathBuf> = Vec::new();
        let mut written_files: Vec<(PathBuf, Option<String>)> = Vec::new();

        let result: RecordResult<()> = (|| {
            // Collect all unique parent directories needed.
            let mut dirs_needed = std::collections::HashSet::new();
            for file in files {
                let full_path = repo.workdir.join(file.relative_path);
                if let Some(parent) = full_path.parent() {
                    let mut current = parent;
                    while current != repo.workdir && !current.exists() {
                        dirs_needed.insert(current.to_path_buf());
                        match current.parent() {
                            Some(parent_of_current) => current = parent_of_current,
                            None => break,
                        }
                    }
                }
            }

            // Create shallowest-first so parents exist before children.
            let mut dirs_to_create: Vec<PathBuf> = dirs_needed.into_iter().collect();
            dirs_to_create.sort_by_key(|p| p.components().count());

            for dir in &dirs_to_create {
                std::fs::create_dir(dir).map_err(RecordError::FileWrite)?;
                created_dirs.push(dir.clone());
            }

            for file in files {
                let full_path = repo.workdir.join(file.relative_path);
                let old_content = file.old_content.map(|s| s.to_string());

                std::fs::write(&full_path, file.content).map_err(RecordError::FileWrite)?;
                written_files.push((full_path, old_content));
            }

            let paths: Vec<PathBuf> = files
                .iter()
                .map(|f| f.relative_path.to_path_buf())
                .collect();
            repo.commit_paths(author, msg, &paths)?;

            Ok(())
        })();

        match result {
            Ok(()) => Ok(()),
            Err(write_error) => {
                // Roll back file changes in reverse order.
                for (full_path, old_content) in written_files.iter().rev() {
                    match old_content {
                        Some(contents) => {
                            let _ = std::fs::write(full_path, contents);
                        }
                        None => {
                            let _ = std::fs::remove_file(full_path);
                        }
                    }
                }

                // Roll back newly created directories, deepest first.
                for dir in created_dirs.iter().rev() {
                    let _ = std::fs::remove_dir(dir);
                }

                Err(write_error)
            }
        }
    }

    /// Initialise a Git repository, commit initial files, and clean up on failure.
    ///
    /// Encapsulates the common creation pattern: either the repository is fully
    /// initialised with its initial commit, or the directory is completely
    /// removed.
    ///
    /// # Errors
    ///
    /// Returns a `RecordError` if initialisation, file writes, or the commit
    /// fail. If the subsequent cleanup also fails, returns
    /// [`RecordError::CleanupAfterInitialiseFailed`] carrying both errors.
    pub(crate) fn init_and_commit(
        record_dir: &Path,
        author: &Author,
        message: &CommitMessage,
        files: &[FileToWrite<'_>],
    ) -> RecordResult<()> {
        let result: RecordResult<()> = (|| {
            let _repo = Self::init(record_dir)?;
            Self::write_and_commit_files(record_dir, author, message, files)?;
            Ok(())
        })();

        match result {
            Ok(()) => Ok(()),
            Err(init_error) => {
                if let Err(cleanup_err) = std::fs::remove_dir_all(record_dir) {
                    return Err(RecordError::CleanupAfterInitialiseFailed {
                        path: record_dir.to_path_buf(),
                        init_error: Box::new(init_error),
                        cleanup_error: cleanup_err,
                    });
                }
                Err(init_error)
            }
        }
    }

    /// Create a commit including only the provided file paths (relative to the repo workdir).
    ///
    /// `relative_paths` may contain repo-workdir-relative paths (recommended) or
    /// absolute paths under the repo workdir; paths containing `..` are rejected.
    pub(crate) fn commit_paths(
        &self,
        author: &Author,
        message: &CommitMessage,
        relative_paths: &[PathBuf],
    ) -> RecordResult<git2::Oid> {
        let rendered = message.render_with_author(author)?;

        self.ensure_main_head()?;
        let mut index = self.repo.index().map_err(RecordError::GitIndex)?;

        for path in relative_paths {
            // `git2::Index::add_path` requires repo-workdir-relative paths.
            let rel = if path.is_absolute() {
                path.strip_prefix(&self.workdir)
                    .map_err(|_| {
                        RecordError::InvalidInput(
                            "path is outside the repository working directory".into(),
                        )
                    })?
                    .to_path_buf()
            } else {
                path.to_path_buf()
            };

            if rel
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
            {
                return Err(RecordError::InvalidInput(
                    "path must not contain parent directory references (..)".into(),
                ));
            }

            index.add_path(&rel).map_err(RecordError::GitAdd)?;
        }

        self.commit_from_index(author, &rendered, &mut index)
    }

    /// Create a commit from the current Git index state.
    fn commit_from_index(
        &self,
        author: &Author,
        message: &str,
        index: &mut git2::Index,
    ) -> RecordResult<git2::Oid> {
        author.validate_commit_author()?;

        let tree_id = index.write_tree().map_err(RecordError::GitWriteTree)?;
        let tree = self
            .repo
            .find_tree(tree_id)
            .map_err(RecordError::GitFindTree)?;

        let sig = git2::Signature::now(author.name.as_str(), author.email.as_str())
            .map_err(RecordError::GitSignature)?;

        let parents = self.resolve_head_parents()?;
        let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .map_err(RecordError::GitCommit)
    }

    /// Resolve the parent commit(s) for a new commit.
    ///
    /// The first commit on an unborn branch has no parents; every later commit
    /// has exactly one, giving each record repository a linear history.
    fn resolve_head_parents(&self) -> RecordResult<Vec<git2::Commit<'_>>> {
        match self.repo.head() {
            Ok(head) => {
                let commit = head.peel_to_commit().map_err(RecordError::GitPeel)?;
                Ok(vec![commit])
            }
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => Ok(vec![]),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(vec![]),
            Err(e) => Err(RecordError::GitHead(e)),
        }
    }

    /// Number of commits reachable from `HEAD` in the repository at `workdir`.
    ///
    /// Used by services and tests to assert that the audit trail grows as
    /// expected. Returns 0 for a repository with an unborn branch.
    pub(crate) fn commit_count(workdir: &Path) -> RecordResult<usize> {
        let service = Self::open(workdir)?;
        let head = match service.repo.head() {
            Ok(head) => head,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(0),
            Err(e) if e.code() == git2::ErrorCode::NotFound => return Ok(0),
            Err(e) => return Err(RecordError::GitHead(e)),
        };

        let mut commit = head.peel_to_commit().map_err(RecordError::GitPeel)?;
        let mut count = 1usize;
        while let Ok(parent) = commit.parent(0) {
            commit = parent;
            count += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::author::AuthorRegistration;
    use tempfile::TempDir;

    fn test_author() -> Author {
        Author {
            name: NonEmptyText::new("Test Author").unwrap(),
            role: NonEmptyText::new("Dentist").unwrap(),
            email: NonEmptyText::new("test@example.com").unwrap(),
            registrations: vec![],
        }
    }

    #[test]
    fn domain_serialises_lowercase() {
        let s = serde_json::to_string(&CommitDomain::Odontogram).unwrap();
        assert_eq!(s, "\"odontogram\"");
    }

    #[test]
    fn action_serialises_lowercase() {
        let s = serde_json::to_string(&CommitAction::Create).unwrap();
        assert_eq!(s, "\"create\"");
    }

    #[test]
    fn render_with_author_orders_trailers_deterministically() {
        let mut author = test_author();
        author.registrations =
            vec![AuthorRegistration::new("CedulaProfesional", "12345").unwrap()];

        let msg = CommitMessage::new(
            CommitDomain::Odontogram,
            CommitAction::Create,
            "Odontogram version recorded",
            "Clinica Dental Sol",
        )
        .unwrap()
        .with_trailer("Version-Kind", "diagnostico")
        .unwrap();

        assert_eq!(
            msg.render_with_author(&author).unwrap(),
            "odontogram:create: Odontogram version recorded\n\n\
             Author-Name: Test Author\n\
             Author-Role: Dentist\n\
             Author-Registration: CedulaProfesional 12345\n\
             Care-Location: Clinica Dental Sol\n\
             Version-Kind: diagnostico"
        );
    }

    #[test]
    fn rejects_multiline_summary() {
        let err = CommitMessage::new(
            CommitDomain::Patient,
            CommitAction::Create,
            "line1\nline2",
            "Clinica Dental Sol",
        )
        .unwrap_err();

        assert!(matches!(err, RecordError::InvalidInput(_)));
    }

    #[test]
    fn rejects_missing_care_location() {
        let err = CommitMessage::new(
            CommitDomain::Patient,
            CommitAction::Create,
            "Patient record created",
            "   ",
        )
        .unwrap_err();

        assert!(matches!(err, RecordError::MissingCareLocation));
    }

    #[test]
    fn rejects_reserved_author_trailer_key() {
        let err = CommitMessage::new(
            CommitDomain::Patient,
            CommitAction::Create,
            "Patient record created",
            "Clinica Dental Sol",
        )
        .unwrap()
        .with_trailer("Author-Name", "Impostor")
        .unwrap_err();

        assert!(matches!(err, RecordError::ReservedAuthorTrailerKey));
    }

    #[test]
    fn rejects_invalid_trailer_key() {
        let err = CommitTrailer::new("Bad:Key", "Value").unwrap_err();
        assert!(matches!(err, RecordError::InvalidInput(_)));
    }

    #[test]
    fn init_and_commit_creates_repository_with_files() {
        let temp_dir = TempDir::new().unwrap();
        let record_dir = temp_dir.path().join("record");
        std::fs::create_dir(&record_dir).unwrap();

        let msg = CommitMessage::new(
            CommitDomain::Patient,
            CommitAction::Create,
            "Patient record created",
            "Clinica Dental Sol",
        )
        .unwrap();

        VersionedFileService::init_and_commit(
            &record_dir,
            &test_author(),
            &msg,
            &[FileToWrite {
                relative_path: Path::new("patient.yaml"),
                content: "given_names: []\n",
                old_content: None,
            }],
        )
        .unwrap();

        assert!(record_dir.join(".git").is_dir());
        assert!(record_dir.join("patient.yaml").is_file());
        assert_eq!(VersionedFileService::commit_count(&record_dir).unwrap(), 1);
    }

    #[test]
    fn write_and_commit_creates_nested_directories() {
        let temp_dir = TempDir::new().unwrap();
        let record_dir = temp_dir.path().join("record");
        std::fs::create_dir(&record_dir).unwrap();

        let create = CommitMessage::new(
            CommitDomain::Odontogram,
            CommitAction::Create,
            "Odontogram version recorded",
            "Clinica Dental Sol",
        )
        .unwrap();

        VersionedFileService::init_and_commit(&record_dir, &test_author(), &create, &[]).unwrap();

        VersionedFileService::write_and_commit_files(
            &record_dir,
            &test_author(),
            &create,
            &[FileToWrite {
                relative_path: Path::new("odontogram/20260101T000000.000Z-abc.json"),
                content: "{}",
                old_content: None,
            }],
        )
        .unwrap();

        assert!(record_dir
            .join("odontogram/20260101T000000.000Z-abc.json")
            .is_file());
        assert_eq!(VersionedFileService::commit_count(&record_dir).unwrap(), 2);
    }

    #[test]
    fn write_and_commit_rejects_parent_dir_traversal() {
        let temp_dir = TempDir::new().unwrap();
        let record_dir = temp_dir.path().join("record");
        std::fs::create_dir(&record_dir).unwrap();

        let msg = CommitMessage::new(
            CommitDomain::Patient,
            CommitAction::Create,
            "Patient record created",
            "Clinica Dental Sol",
        )
        .unwrap();

        VersionedFileService::init_and_commit(&record_dir, &test_author(), &msg, &[]).unwrap();

        let err = VersionedFileService::write_and_commit_files(
            &record_dir,
            &test_author(),
            &msg,
            &[FileToWrite {
                relative_path: Path::new("../escape.yaml"),
                content: "nope",
                old_content: None,
            }],
        )
        .unwrap_err();

        assert!(matches!(err, RecordError::InvalidInput(_)));
        assert!(!temp_dir.path().join("escape.yaml").exists());
    }

    #[test]
    fn init_and_commit_cleans_up_on_failure() {
        let temp_dir = TempDir::new().unwrap();
        let record_dir = temp_dir.path().join("record");
        std::fs::create_dir(&record_dir).unwrap();

        let msg = CommitMessage::new(
            CommitDomain::Patient,
            CommitAction::Create,
            "Patient record created",
            "Clinica Dental Sol",
        )
        .unwrap();

        // A traversal path makes the commit step fail after init.
        let err = VersionedFileService::init_and_commit(
            &record_dir,
            &test_author(),
            &msg,
            &[FileToWrite {
                relative_path: Path::new("../escape.yaml"),
                content: "nope",
                old_content: None,
            }],
        )
        .unwrap_err();

        assert!(matches!(err, RecordError::InvalidInput(_)));
        assert!(!record_dir.exists(), "record dir should be cleaned up");
    }
}
