// ABOUTME: Error types for the init, deploy, rollback, and status pipelines.
// ABOUTME: Distinguishes expected conditions (contention, missing project) from remote failures.

use crate::project::ProjectName;
use crate::remote::RemoteError;

/// Errors returned by pipeline operations.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// The project's deploy directory does not exist on the remote host.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectName),

    /// Another deployment holds the project's lock.
    #[error("deployment lock unavailable for {0}")]
    LockUnavailable(ProjectName),

    /// No technique in the registry matched the project.
    #[error("unsupported project type: {0}")]
    UnsupportedProject(ProjectName),

    /// The project's backup directory holds no archives.
    #[error("no backups found for {0}")]
    NoBackups(ProjectName),

    /// The requested archive is not in the project's backup directory.
    #[error("backup {backup} not found for {project}")]
    BackupNotFound {
        project: ProjectName,
        backup: String,
    },

    /// Init refuses to provision directories as root.
    #[error("remote user is root; refusing to initialize")]
    RootUser,

    /// A remote command or probe failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Discriminant of [`DeployError`] for matching without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployErrorKind {
    ProjectNotFound,
    LockUnavailable,
    UnsupportedProject,
    NoBackups,
    BackupNotFound,
    RootUser,
    Remote,
}

impl DeployError {
    pub fn kind(&self) -> DeployErrorKind {
        match self {
            DeployError::ProjectNotFound(_) => DeployErrorKind::ProjectNotFound,
            DeployError::LockUnavailable(_) => DeployErrorKind::LockUnavailable,
            DeployError::UnsupportedProject(_) => DeployErrorKind::UnsupportedProject,
            DeployError::NoBackups(_) => DeployErrorKind::NoBackups,
            DeployError::BackupNotFound { .. } => DeployErrorKind::BackupNotFound,
            DeployError::RootUser => DeployErrorKind::RootUser,
            DeployError::Remote(_) => DeployErrorKind::Remote,
        }
    }
}

/// A failed pipeline call: the populated result record plus the error.
///
/// The record always carries a message naming the failed step, so callers can
/// report it even when they only branch on `error`.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct Failure<R: std::fmt::Debug> {
    pub result: R,
    #[source]
    pub error: DeployError,
}

impl<R: std::fmt::Debug> Failure<R> {
    pub fn new(result: R, error: impl Into<DeployError>) -> Self {
        Self {
            result,
            error: error.into(),
        }
    }

    pub fn kind(&self) -> DeployErrorKind {
        self.error.kind()
    }
}

/// A step failure inside a pipeline: the message for the result record and
/// the underlying error.
#[derive(Debug)]
pub(crate) struct StepError {
    pub message: String,
    pub error: DeployError,
}

impl StepError {
    pub fn new(message: impl Into<String>, error: impl Into<DeployError>) -> Self {
        Self {
            message: message.into(),
            error: error.into(),
        }
    }
}

/// Build a `map_err` adapter that tags an error with a step message.
pub(crate) fn step<E: Into<DeployError>>(message: &str) -> impl FnOnce(E) -> StepError + '_ {
    move |e| StepError::new(message, e)
}
