// ABOUTME: RemoteFileSystem built from shell commands run through a RemoteExecutor.
// ABOUTME: Compound existence checks are answered in one round trip.

use async_trait::async_trait;

use super::{RemoteError, RemoteExecutor, RemoteFileSystem};
use crate::shell::escape;

const FOUND: &str = "found";
const MISSING: &str = "missing";

/// Filesystem probes implemented with `test`, `mkdir` and `ls`.
#[derive(Debug, Clone)]
pub struct ShellFileSystem<E> {
    exec: E,
}

impl<E: RemoteExecutor> ShellFileSystem<E> {
    pub fn new(exec: E) -> Self {
        Self { exec }
    }

    /// Evaluate a test expression remotely, answering a definite found/missing.
    async fn probe(&self, condition: &str) -> Result<bool, RemoteError> {
        let out = self
            .exec
            .run(&format!("( {condition} ) && echo {FOUND} || echo {MISSING}"))
            .await?;
        Ok(out.lines().any(|line| line.trim() == FOUND))
    }
}

fn file_tests(paths: &[String], joiner: &str) -> String {
    paths
        .iter()
        .map(|p| format!("[ -e {} ]", escape(p)))
        .collect::<Vec<_>>()
        .join(joiner)
}

#[async_trait]
impl<E: RemoteExecutor> RemoteFileSystem for ShellFileSystem<E> {
    async fn exists(&self, path: &str) -> Result<bool, RemoteError> {
        self.probe(&format!("test -e {}", escape(path))).await
    }

    async fn mkdir(&self, path: &str, recursive: bool) -> Result<(), RemoteError> {
        let flag = if recursive { "-p " } else { "" };
        self.exec
            .run(&format!("mkdir {flag}{}", escape(path)))
            .await?;
        Ok(())
    }

    async fn list(&self, path: &str) -> Result<Vec<String>, RemoteError> {
        let out = self.exec.run(&format!("ls -1 {}", escape(path))).await?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    async fn exists_all(&self, paths: &[String]) -> Result<bool, RemoteError> {
        if paths.is_empty() {
            return Ok(true);
        }
        self.probe(&file_tests(paths, " && ")).await
    }

    async fn exists_any(&self, paths: &[String]) -> Result<bool, RemoteError> {
        if paths.is_empty() {
            return Ok(false);
        }
        self.probe(&file_tests(paths, " || ")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::io::AsyncWrite;

    /// Records commands and answers every one with a fixed output.
    struct Scripted {
        output: String,
        commands: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(output: &str) -> Self {
            Self {
                output: output.to_string(),
                commands: Mutex::new(Vec::new()),
            }
        }

        fn commands(&self) -> Vec<String> {
            self.commands.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RemoteExecutor for Scripted {
        async fn run(&self, command: &str) -> Result<String, RemoteError> {
            self.commands.lock().unwrap().push(command.to_string());
            Ok(self.output.clone())
        }

        async fn run_stream(
            &self,
            _command: &str,
            _sink: &mut (dyn AsyncWrite + Unpin + Send),
        ) -> Result<(), RemoteError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn exists_escapes_path_and_reads_marker() {
        let exec = Scripted::new("found\n");
        let fs = ShellFileSystem::new(&exec);

        assert!(fs.exists("/var/www/it's").await.unwrap());
        assert_eq!(
            exec.commands(),
            vec!["( test -e '/var/www/it'\\''s' ) && echo found || echo missing"]
        );
    }

    #[tokio::test]
    async fn missing_marker_means_absent() {
        let exec = Scripted::new("missing\n");
        let fs = ShellFileSystem::new(&exec);
        assert!(!fs.exists("/var/www/demo").await.unwrap());
    }

    #[tokio::test]
    async fn compound_checks_use_one_round_trip() {
        let exec = Scripted::new("found\n");
        let fs = ShellFileSystem::new(&exec);
        let paths = vec!["/a/artisan".to_string(), "/a/composer.json".to_string()];

        assert!(fs.exists_all(&paths).await.unwrap());
        assert!(fs.exists_any(&paths).await.unwrap());

        let commands = exec.commands();
        assert_eq!(commands.len(), 2);
        assert_eq!(
            commands[0],
            "( [ -e '/a/artisan' ] && [ -e '/a/composer.json' ] ) && echo found || echo missing"
        );
        assert_eq!(
            commands[1],
            "( [ -e '/a/artisan' ] || [ -e '/a/composer.json' ] ) && echo found || echo missing"
        );
    }

    #[tokio::test]
    async fn list_of_empty_directory_is_empty() {
        let exec = Scripted::new("");
        let fs = ShellFileSystem::new(&exec);
        assert!(fs.list("/var/backups/demo").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn list_splits_lines() {
        let exec = Scripted::new("demo-1.tgz\ndemo-2.tgz\n");
        let fs = ShellFileSystem::new(&exec);
        assert_eq!(
            fs.list("/var/backups/demo").await.unwrap(),
            vec!["demo-1.tgz", "demo-2.tgz"]
        );
    }

    #[tokio::test]
    async fn mkdir_recursive_uses_parents_flag() {
        let exec = Scripted::new("");
        let fs = ShellFileSystem::new(&exec);
        fs.mkdir("/var/backups/demo", true).await.unwrap();
        fs.mkdir("/var/backups/other", false).await.unwrap();
        assert_eq!(
            exec.commands(),
            vec!["mkdir -p '/var/backups/demo'", "mkdir '/var/backups/other'"]
        );
    }
}
