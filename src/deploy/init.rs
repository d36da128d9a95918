// ABOUTME: Init pipeline: provision remote directories and the bare repository for a project.
// ABOUTME: Refuses to run as root so deployed files aren't owned by the superuser.

use chrono::Utc;

use super::error::{StepError, step};
use super::lock::LockManager;
use super::outcome::InitResult;
use super::{DeployError, Failure, Orchestrator};
use crate::project::{Project, ProjectName, parent_dir};
use crate::remote::{RemoteExecutor, RemoteFileSystem};
use crate::shell::escape;

impl<E, F, L> Orchestrator<E, F, L>
where
    E: RemoteExecutor,
    F: RemoteFileSystem,
    L: LockManager,
{
    /// Create the project's directories and an empty bare repository.
    ///
    /// Safe to run again: existing directories and repositories are kept.
    pub async fn init(&self, name: &ProjectName) -> Result<InitResult, Failure<InitResult>> {
        let project = self.project(name);
        let timestamp = Utc::now();

        match self.run_init(&project).await {
            Ok(()) => {
                let message = format!(
                    "project {} initialized at {}",
                    project.name, project.deploy_dir
                );
                tracing::info!("{}", message);
                Ok(InitResult {
                    project,
                    success: true,
                    message,
                    timestamp,
                })
            }
            Err(StepError { message, error }) => {
                tracing::error!("Init of {} failed: {}: {}", project.name, message, error);
                Err(Failure::new(
                    InitResult {
                        project,
                        success: false,
                        message,
                        timestamp,
                    },
                    error,
                ))
            }
        }
    }

    async fn run_init(&self, project: &Project) -> Result<(), StepError> {
        let uid = self
            .exec
            .run("id -u")
            .await
            .map_err(step("failed to verify remote user"))?;
        if uid.trim() == "0" {
            return Err(StepError::new(
                "refusing to run as root user",
                DeployError::RootUser,
            ));
        }

        let dirs = [
            project.repo_path.as_str(),
            project.deploy_dir.as_str(),
            project.backup_dir.as_str(),
            parent_dir(&project.log_file),
            parent_dir(&project.lock_file),
        ];
        for dir in dirs {
            self.fs
                .mkdir(dir, true)
                .await
                .map_err(|e| StepError::new(format!("unable to create {dir}"), e))?;
        }

        let repo = escape(&project.repo_path);
        self.exec
            .run(&format!(
                "test -f {}/HEAD || git init --bare {}",
                repo, repo
            ))
            .await
            .map_err(step("failed to initialize bare repository"))?;

        Ok(())
    }
}
