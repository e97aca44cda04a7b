#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("patient not found: {0}")]
    PatientNotFound(String),
    #[error("odontogram version not found: {0}")]
    VersionNotFound(String),
    #[error("appointment not found: {0}")]
    AppointmentNotFound(String),
    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to create record directory: {0}")]
    RecordDirCreation(std::io::Error),
    #[error(
        "initialise failed and cleanup also failed (path: {path}): init={init_error}; cleanup={cleanup_error}",
        path = path.display()
    )]
    CleanupAfterInitialiseFailed {
        path: std::path::PathBuf,
        #[source]
        init_error: Box<RecordError>,
        cleanup_error: std::io::Error,
    },
    #[error("failed to write record file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read record file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize record: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize record: {0}")]
    Deserialization(serde_json::Error),
    #[error("failed to serialize YAML: {0}")]
    YamlSerialization(serde_yaml::Error),
    #[error("failed to deserialize YAML: {0}")]
    YamlDeserialization(serde_yaml::Error),

    #[error("identifier error: {0}")]
    Uuid(#[from] dcr_uuid::UuidError),
    #[error("image storage error: {0}")]
    Files(#[from] dcr_files::FilesError),

    #[error("failed to initialise git repository: {0}")]
    GitInit(git2::Error),
    #[error("failed to open git repository: {0}")]
    GitOpen(git2::Error),
    #[error("failed to access git index: {0}")]
    GitIndex(git2::Error),
    #[error("failed to add file to git index: {0}")]
    GitAdd(git2::Error),
    #[error("failed to write git tree: {0}")]
    GitWriteTree(git2::Error),
    #[error("failed to find git tree: {0}")]
    GitFindTree(git2::Error),
    #[error("failed to create git signature: {0}")]
    GitSignature(git2::Error),
    #[error("failed to create git commit: {0}")]
    GitCommit(git2::Error),
    #[error("failed to get git head: {0}")]
    GitHead(git2::Error),
    #[error("failed to set git head: {0}")]
    GitSetHead(git2::Error),
    #[error("failed to peel git commit: {0}")]
    GitPeel(git2::Error),

    #[error("invalid Author-Registration")]
    InvalidAuthorRegistration,
    #[error("author trailer keys are reserved")]
    ReservedAuthorTrailerKey,

    #[error("invalid Care-Location")]
    InvalidCareLocation,
    #[error("missing Care-Location")]
    MissingCareLocation,
    #[error("Care-Location trailer key is reserved")]
    ReservedCareLocationTrailerKey,
}

pub type RecordResult<T> = std::result::Result<T, RecordError>;
