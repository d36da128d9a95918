// ABOUTME: Deploy pipeline: verify, lock, snapshot, update sources, select and run a technique.
// ABOUTME: Fail-fast; the lock is held for the whole mutating section and always released.

use chrono::{DateTime, Utc};

use super::backup::archive_name;
use super::error::{StepError, step};
use super::lock::{LockError, LockManager, with_lock};
use super::outcome::DeployResult;
use super::{DeployError, Failure, Orchestrator};
use crate::diagnostics::Diagnostics;
use crate::project::{Project, ProjectName};
use crate::remote::{RemoteExecutor, RemoteFileSystem};
use crate::shell::escape;
use crate::technique::Technique;

impl From<LockError> for StepError {
    fn from(err: LockError) -> Self {
        let message = match err {
            LockError::Unavailable(_) => "deployment lock unavailable",
            LockError::Remote(_) => "failed to acquire deployment lock",
        };
        StepError::new(message, err)
    }
}

impl<E, F, L> Orchestrator<E, F, L>
where
    E: RemoteExecutor,
    F: RemoteFileSystem,
    L: LockManager,
{
    /// Deploy the configured branch of a project.
    ///
    /// The working tree is hard-reset to the remote branch, discarding any
    /// changes made on the host. The snapshot taken just before is the only
    /// way back.
    pub async fn deploy(&self, name: &ProjectName) -> Result<DeployResult, Failure<DeployResult>> {
        let project = self.project(name);
        let started = Utc::now();
        let mut result = DeployResult::new(&project, started);
        let mut diag = Diagnostics::default();

        tracing::info!("Deploying {} from branch {}", project.name, self.branch);
        let outcome = self
            .run_deploy(&project, started, &mut result, &mut diag)
            .await;
        result.warnings = diag.into_warnings();

        match outcome {
            Ok(technique) => {
                result.success = true;
                result.status = "deployed".to_string();
                result.message = format!("{} deployed with {} strategy", project.name, technique);
                tracing::info!("{}", result.message);
                Ok(result)
            }
            Err(StepError { message, error }) => {
                tracing::error!("Deploy of {} failed: {}: {}", project.name, message, error);
                result.message = message;
                Err(Failure::new(result, error))
            }
        }
    }

    async fn run_deploy(
        &self,
        project: &Project,
        started: DateTime<Utc>,
        result: &mut DeployResult,
        diag: &mut Diagnostics,
    ) -> Result<Technique, StepError> {
        let exists = self
            .fs
            .exists(&project.deploy_dir)
            .await
            .map_err(step("failed to check project path"))?;
        if !exists {
            return Err(StepError::new(
                "project not found",
                DeployError::ProjectNotFound(project.name.clone()),
            ));
        }

        with_lock(
            &self.lock,
            project,
            diag,
            self.deploy_locked(project, started, result),
        )
        .await
    }

    async fn deploy_locked(
        &self,
        project: &Project,
        started: DateTime<Utc>,
        result: &mut DeployResult,
    ) -> Result<Technique, StepError> {
        self.fs
            .mkdir(&project.backup_dir, true)
            .await
            .map_err(step("failed to ensure backup directory"))?;

        let archive = archive_name(&project.name, started);
        tracing::debug!("Snapshotting {} to {}", project.deploy_dir, archive);
        self.exec
            .run(&format!(
                "tar -czf {} -C {} .",
                escape(&project.backup_path(&archive)),
                escape(&project.deploy_dir)
            ))
            .await
            .map_err(step("failed to create backup"))?;
        result.backup = Some(archive);

        tracing::debug!("Resetting {} to origin/{}", project.deploy_dir, self.branch);
        self.exec
            .run(&format!(
                "cd {} && git fetch origin {} && git reset --hard {}",
                escape(&project.deploy_dir),
                escape(&self.branch),
                escape(&format!("origin/{}", self.branch))
            ))
            .await
            .map_err(step("failed to update sources"))?;

        let technique = self.select_technique(project).await.ok_or_else(|| {
            StepError::new(
                "unsupported project type",
                DeployError::UnsupportedProject(project.name.clone()),
            )
        })?;
        result.strategy = Some(technique);

        tracing::info!("Running {} deployment for {}", technique, project.name);
        technique
            .deploy(project, &self.exec)
            .await
            .map_err(|e| StepError::new(format!("{technique} deployment failed"), e))?;

        Ok(technique)
    }
}
