// ABOUTME: Deploy lock to prevent concurrent deployments of the same project.
// ABOUTME: Uses atomic noclobber file creation on the remote host with stale-lock reclaim.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use super::DeployError;
use crate::diagnostics::{Diagnostics, Warning};
use crate::project::{Project, ProjectName};
use crate::remote::{RemoteError, RemoteExecutor};
use crate::shell::escape;

/// Age after which a lock is considered abandoned and may be reclaimed.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(60 * 60);

/// Information about who holds a deploy lock, written into the lock file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockInfo {
    /// Hostname of the machine that holds the lock.
    pub holder: String,
    /// Process ID of the lock holder.
    pub pid: u32,
    /// When the lock was acquired.
    pub started_at: DateTime<Utc>,
    /// Project being deployed.
    pub project: String,
}

impl LockInfo {
    /// Create new lock info for the current process.
    pub fn new(project: &ProjectName) -> Self {
        Self {
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            started_at: Utc::now(),
            project: project.to_string(),
        }
    }
}

/// Mutual exclusion over one remote lock file per project.
#[async_trait]
pub trait LockManager: Send + Sync {
    /// Try to take the lock. `Ok(false)` means another holder has it.
    async fn acquire(&self, project: &Project) -> Result<bool, RemoteError>;

    /// Drop the lock. Releasing a lock that isn't held is not an error.
    async fn release(&self, project: &Project) -> Result<(), RemoteError>;

    /// Who currently holds the lock, if anyone.
    async fn holder(&self, project: &Project) -> Result<Option<LockInfo>, RemoteError>;
}

#[async_trait]
impl<T: LockManager + ?Sized> LockManager for &T {
    async fn acquire(&self, project: &Project) -> Result<bool, RemoteError> {
        (**self).acquire(project).await
    }

    async fn release(&self, project: &Project) -> Result<(), RemoteError> {
        (**self).release(project).await
    }

    async fn holder(&self, project: &Project) -> Result<Option<LockInfo>, RemoteError> {
        (**self).holder(project).await
    }
}

/// Lock files on the remote host, created with shell noclobber mode.
#[derive(Debug, Clone)]
pub struct RemoteLock<E> {
    exec: E,
    stale_after: Duration,
}

impl<E: RemoteExecutor> RemoteLock<E> {
    pub fn new(exec: E) -> Self {
        Self {
            exec,
            stale_after: DEFAULT_STALE_AFTER,
        }
    }

    pub fn stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Atomic create-if-absent of the lock file.
    ///
    /// `set -C` makes `>` fail when the file exists, so there is no window
    /// between the existence check and the write.
    async fn try_create(&self, project: &Project) -> Result<bool, RemoteError> {
        let info = LockInfo::new(&project.name);
        let json = serde_json::to_string(&info).unwrap_or_else(|_| format!("{}", info.pid));
        let cmd = format!(
            "if (set -C; printf '%s\\n' {} > {}) 2>/dev/null; then echo acquired; else echo busy; fi",
            escape(&json),
            escape(&project.lock_file)
        );
        let out = self.exec.run(&cmd).await?;
        Ok(out.lines().any(|line| line.trim() == "acquired"))
    }

    /// Whether the lock file is older than the staleness threshold.
    ///
    /// `find -mmin` works in whole minutes; partial minutes round up so a
    /// holder is never reclaimed before the configured age.
    async fn is_stale(&self, project: &Project) -> Result<bool, RemoteError> {
        let minutes = self.stale_after.as_secs().div_ceil(60).max(1);
        let out = self
            .exec
            .run(&format!(
                "find {} -mmin +{} 2>/dev/null",
                escape(&project.lock_file),
                minutes
            ))
            .await?;
        Ok(!out.trim().is_empty())
    }
}

#[async_trait]
impl<E: RemoteExecutor> LockManager for RemoteLock<E> {
    /// Take the lock, reclaiming it once if the current holder is stale.
    ///
    /// A failing staleness probe reports the lock as held rather than
    /// erroring out.
    async fn acquire(&self, project: &Project) -> Result<bool, RemoteError> {
        if self.try_create(project).await? {
            tracing::debug!("Acquired lock {}", project.lock_file);
            return Ok(true);
        }

        match self.is_stale(project).await {
            Ok(true) => {}
            Ok(false) => return Ok(false),
            Err(e) => {
                tracing::warn!(
                    "Failed to check lock staleness for {}: {}",
                    project.lock_file,
                    e
                );
                return Ok(false);
            }
        }

        tracing::warn!(
            "Reclaiming stale lock {} (older than {:?})",
            project.lock_file,
            self.stale_after
        );
        if let Err(e) = self.release(project).await {
            tracing::warn!("Failed to remove stale lock {}: {}", project.lock_file, e);
        }

        self.try_create(project).await
    }

    async fn release(&self, project: &Project) -> Result<(), RemoteError> {
        self.exec
            .run(&format!("rm -f {}", escape(&project.lock_file)))
            .await?;
        Ok(())
    }

    async fn holder(&self, project: &Project) -> Result<Option<LockInfo>, RemoteError> {
        let out = self
            .exec
            .run(&format!(
                "cat {} 2>/dev/null || true",
                escape(&project.lock_file)
            ))
            .await?;
        let content = out.trim();
        if content.is_empty() {
            return Ok(None);
        }
        match serde_json::from_str(content) {
            Ok(info) => Ok(Some(info)),
            Err(_) => {
                // Lock written by something other than skiff (e.g. a bare pid).
                Ok(Some(LockInfo {
                    holder: "unknown".to_string(),
                    pid: content.parse().unwrap_or(0),
                    started_at: DateTime::<Utc>::default(),
                    project: project.name.to_string(),
                }))
            }
        }
    }
}

/// Failure to enter a locked section.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("deployment lock unavailable for {0}")]
    Unavailable(ProjectName),

    #[error("failed to acquire deployment lock: {0}")]
    Remote(#[from] RemoteError),
}

impl From<LockError> for DeployError {
    fn from(err: LockError) -> Self {
        match err {
            LockError::Unavailable(project) => DeployError::LockUnavailable(project),
            LockError::Remote(e) => DeployError::Remote(e),
        }
    }
}

/// Run `work` while holding the project's lock.
///
/// The lock is released on every exit path of `work`: success, error, or
/// panic (the panic resumes after release). A failed release is recorded as
/// a warning and never replaces the outcome of `work`.
pub async fn with_lock<L, F, T, E>(
    lock: &L,
    project: &Project,
    diag: &mut Diagnostics,
    work: F,
) -> Result<T, E>
where
    L: LockManager + ?Sized,
    F: Future<Output = Result<T, E>>,
    E: From<LockError>,
{
    if !lock.acquire(project).await.map_err(LockError::from)? {
        return Err(LockError::Unavailable(project.name.clone()).into());
    }

    let outcome = AssertUnwindSafe(work).catch_unwind().await;

    if let Err(e) = lock.release(project).await {
        diag.warn(Warning::lock_release(format!(
            "failed to release lock {}: {}",
            project.lock_file, e
        )));
    }

    match outcome {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
