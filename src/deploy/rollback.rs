// ABOUTME: Rollback pipeline: restore a backup archive over the deploy directory.
// ABOUTME: Restarting the detected technique afterwards is best-effort.

use chrono::Utc;

use super::error::{StepError, step};
use super::lock::LockManager;
use super::outcome::RollbackResult;
use super::{DeployError, Failure, Orchestrator};
use crate::diagnostics::{Diagnostics, Warning};
use crate::project::{Project, ProjectName};
use crate::remote::{RemoteExecutor, RemoteFileSystem};
use crate::shell::escape;

impl<E, F, L> Orchestrator<E, F, L>
where
    E: RemoteExecutor,
    F: RemoteFileSystem,
    L: LockManager,
{
    /// Restore `backup`, or the latest archive when `None`.
    ///
    /// The archive is extracted in place over the deploy directory; there is
    /// no staging copy.
    pub async fn rollback(
        &self,
        name: &ProjectName,
        backup: Option<&str>,
    ) -> Result<RollbackResult, Failure<RollbackResult>> {
        let project = self.project(name);
        let mut result = RollbackResult::new(&project, Utc::now());
        let mut diag = Diagnostics::default();

        tracing::info!("Rolling back {}", project.name);
        let outcome = self.run_rollback(&project, backup, &mut diag).await;
        result.warnings = diag.into_warnings();

        match outcome {
            Ok(chosen) => {
                result.success = true;
                result.message = format!("rollback complete using {chosen}");
                result.restored = Some(chosen);
                tracing::info!("{}", result.message);
                Ok(result)
            }
            Err(StepError { message, error }) => {
                tracing::error!("Rollback of {} failed: {}: {}", project.name, message, error);
                result.message = message;
                Err(Failure::new(result, error))
            }
        }
    }

    async fn run_rollback(
        &self,
        project: &Project,
        backup: Option<&str>,
        diag: &mut Diagnostics,
    ) -> Result<String, StepError> {
        let entries = self
            .fs
            .list(&project.backup_dir)
            .await
            .map_err(step("failed to list backups"))?;
        if entries.is_empty() {
            return Err(StepError::new(
                "no backups available",
                DeployError::NoBackups(project.name.clone()),
            ));
        }

        let chosen = match backup {
            Some(requested) => {
                if !entries.iter().any(|entry| entry == requested) {
                    return Err(StepError::new(
                        format!("backup {requested} not found"),
                        DeployError::BackupNotFound {
                            project: project.name.clone(),
                            backup: requested.to_string(),
                        },
                    ));
                }
                requested.to_string()
            }
            None => self
                .backup_selection
                .latest(&project.name, &entries)
                .map(str::to_string)
                .ok_or_else(|| {
                    StepError::new(
                        "no backups available",
                        DeployError::NoBackups(project.name.clone()),
                    )
                })?,
        };

        tracing::debug!("Extracting {} over {}", chosen, project.deploy_dir);
        self.exec
            .run(&format!(
                "tar -xzf {} -C {}",
                escape(&project.backup_path(&chosen)),
                escape(&project.deploy_dir)
            ))
            .await
            .map_err(step("failed to restore backup"))?;

        match self.select_technique(project).await {
            Some(technique) => {
                if let Err(e) = technique.restart(project, &self.exec).await {
                    diag.warn(Warning::restart(format!(
                        "{technique} restart of {} failed after rollback: {e}",
                        project.name
                    )));
                }
            }
            None => tracing::debug!("No technique matched {}; skipping restart", project.name),
        }

        Ok(chosen)
    }
}
