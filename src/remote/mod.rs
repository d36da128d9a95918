// ABOUTME: Capability traits for the remote host: command execution and filesystem probes.
// ABOUTME: Pipelines reach remote state only through these, so tests can swap in fakes.

mod error;
mod executor;
mod filesystem;

pub use error::RemoteError;
pub use filesystem::ShellFileSystem;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::AsyncWrite;

/// Runs POSIX shell command strings on the remote host.
///
/// Callers are responsible for escaping every interpolated value with
/// [`crate::shell::escape`].
#[async_trait]
pub trait RemoteExecutor: Send + Sync {
    /// Run a command and return its combined stdout and stderr.
    ///
    /// A non-zero exit status is reported as [`RemoteError::CommandFailed`].
    async fn run(&self, command: &str) -> Result<String, RemoteError>;

    /// Run a command, forwarding its output to `sink` while it runs.
    async fn run_stream(
        &self,
        command: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<(), RemoteError>;
}

/// Primitive filesystem probes on the remote host.
#[async_trait]
pub trait RemoteFileSystem: Send + Sync {
    async fn exists(&self, path: &str) -> Result<bool, RemoteError>;

    async fn mkdir(&self, path: &str, recursive: bool) -> Result<(), RemoteError>;

    /// Entry names inside a directory. An empty directory yields an empty list.
    async fn list(&self, path: &str) -> Result<Vec<String>, RemoteError>;

    /// Whether every path exists.
    ///
    /// The default checks one path at a time; implementations backed by a
    /// round trip per call should answer in a single request.
    async fn exists_all(&self, paths: &[String]) -> Result<bool, RemoteError> {
        for path in paths {
            if !self.exists(path).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Whether at least one path exists.
    async fn exists_any(&self, paths: &[String]) -> Result<bool, RemoteError> {
        for path in paths {
            if self.exists(path).await? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[async_trait]
impl<T: RemoteExecutor + ?Sized> RemoteExecutor for &T {
    async fn run(&self, command: &str) -> Result<String, RemoteError> {
        (**self).run(command).await
    }

    async fn run_stream(
        &self,
        command: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<(), RemoteError> {
        (**self).run_stream(command, sink).await
    }
}

#[async_trait]
impl<T: RemoteExecutor + ?Sized> RemoteExecutor for Arc<T> {
    async fn run(&self, command: &str) -> Result<String, RemoteError> {
        (**self).run(command).await
    }

    async fn run_stream(
        &self,
        command: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<(), RemoteError> {
        (**self).run_stream(command, sink).await
    }
}

#[async_trait]
impl<T: RemoteFileSystem + ?Sized> RemoteFileSystem for &T {
    async fn exists(&self, path: &str) -> Result<bool, RemoteError> {
        (**self).exists(path).await
    }

    async fn mkdir(&self, path: &str, recursive: bool) -> Result<(), RemoteError> {
        (**self).mkdir(path, recursive).await
    }

    async fn list(&self, path: &str) -> Result<Vec<String>, RemoteError> {
        (**self).list(path).await
    }

    async fn exists_all(&self, paths: &[String]) -> Result<bool, RemoteError> {
        (**self).exists_all(paths).await
    }

    async fn exists_any(&self, paths: &[String]) -> Result<bool, RemoteError> {
        (**self).exists_any(paths).await
    }
}

#[async_trait]
impl<T: RemoteFileSystem + ?Sized> RemoteFileSystem for Arc<T> {
    async fn exists(&self, path: &str) -> Result<bool, RemoteError> {
        (**self).exists(path).await
    }

    async fn mkdir(&self, path: &str, recursive: bool) -> Result<(), RemoteError> {
        (**self).mkdir(path, recursive).await
    }

    async fn list(&self, path: &str) -> Result<Vec<String>, RemoteError> {
        (**self).list(path).await
    }

    async fn exists_all(&self, paths: &[String]) -> Result<bool, RemoteError> {
        (**self).exists_all(paths).await
    }

    async fn exists_any(&self, paths: &[String]) -> Result<bool, RemoteError> {
        (**self).exists_any(paths).await
    }
}
