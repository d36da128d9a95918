// ABOUTME: RemoteExecutor implementation over an SSH session.
// ABOUTME: Maps non-zero exit statuses to RemoteError::CommandFailed.

use async_trait::async_trait;
use tokio::io::AsyncWrite;

use super::{RemoteError, RemoteExecutor};
use crate::ssh::Session;

#[async_trait]
impl RemoteExecutor for Session {
    async fn run(&self, command: &str) -> Result<String, RemoteError> {
        let output = self.exec(command).await?;
        let combined = output.combined();

        if !output.success() {
            return Err(RemoteError::CommandFailed {
                command: command.to_string(),
                exit_code: output.exit_code,
                output: combined,
            });
        }

        Ok(combined)
    }

    async fn run_stream(
        &self,
        command: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<(), RemoteError> {
        let exit_code = self.exec_streaming(command, sink).await?;

        if exit_code != 0 {
            return Err(RemoteError::CommandFailed {
                command: command.to_string(),
                exit_code,
                output: String::new(),
            });
        }

        Ok(())
    }
}
