// ABOUTME: Log tailing for a project's deploy log.
// ABOUTME: Streams `tail` output from the remote host into a local sink.

use tokio::io::AsyncWrite;

use super::lock::LockManager;
use super::{DeployError, Orchestrator};
use crate::project::ProjectName;
use crate::remote::{RemoteExecutor, RemoteFileSystem};
use crate::shell::escape;

/// Lines shown when the caller asks for zero.
pub const DEFAULT_LOG_LINES: usize = 100;

impl<E, F, L> Orchestrator<E, F, L>
where
    E: RemoteExecutor,
    F: RemoteFileSystem,
    L: LockManager,
{
    /// Stream the last `lines` lines of the project's log, following new
    /// output when `follow` is set.
    pub async fn tail_logs(
        &self,
        name: &ProjectName,
        lines: usize,
        follow: bool,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<(), DeployError> {
        let project = self.project(name);
        let lines = if lines == 0 { DEFAULT_LOG_LINES } else { lines };
        let follow_flag = if follow { " -F" } else { "" };

        self.exec
            .run_stream(
                &format!(
                    "tail -n {lines}{follow_flag} {}",
                    escape(&project.log_file)
                ),
                sink,
            )
            .await?;
        Ok(())
    }
}
