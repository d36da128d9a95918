// ABOUTME: Error type for remote command execution and filesystem probes.
// ABOUTME: Opaque wrapper around transport failures and non-zero exit statuses.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("command `{command}` exited with status {exit_code}: {}", .output.trim())]
    CommandFailed {
        command: String,
        exit_code: u32,
        output: String,
    },

    #[error("SSH error: {0}")]
    Ssh(#[from] crate::ssh::Error),

    #[error("failed to write command output: {0}")]
    Io(#[from] std::io::Error),
}
