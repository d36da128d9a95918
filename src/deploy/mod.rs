// ABOUTME: Deployment orchestration: locking, backups, and the init/deploy/rollback/status pipelines.
// ABOUTME: Exports the Orchestrator and the result records each pipeline returns.

mod backup;
mod error;
mod init;
mod lock;
mod logs;
mod orchestrator;
mod outcome;
mod push;
mod rollback;
mod status;

pub use backup::{BackupSelection, archive_name, archive_timestamp};
pub use error::{DeployError, DeployErrorKind, Failure};
pub use lock::{
    DEFAULT_STALE_AFTER, LockError, LockInfo, LockManager, RemoteLock, with_lock,
};
pub use logs::DEFAULT_LOG_LINES;
pub use orchestrator::{DEFAULT_BRANCH, Orchestrator};
pub use outcome::{DeployResult, InitResult, RollbackResult, StatusResult};
