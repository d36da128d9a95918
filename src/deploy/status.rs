// ABOUTME: Status pipeline: detect the project's technique and report liveness.
// ABOUTME: A missing deploy directory is a normal answer, not an error.

use chrono::Utc;

use super::lock::LockManager;
use super::outcome::StatusResult;
use super::{DeployError, Failure, Orchestrator};
use crate::project::ProjectName;
use crate::remote::{RemoteExecutor, RemoteFileSystem};

impl<E, F, L> Orchestrator<E, F, L>
where
    E: RemoteExecutor,
    F: RemoteFileSystem,
    L: LockManager,
{
    pub async fn status(&self, name: &ProjectName) -> Result<StatusResult, Failure<StatusResult>> {
        let project = self.project(name);
        let mut result = StatusResult::new(&project, Utc::now());

        let exists = match self.fs.exists(&project.deploy_dir).await {
            Ok(exists) => exists,
            Err(e) => {
                result.message = "failed to check project path".to_string();
                return Err(Failure::new(result, e));
            }
        };
        if !exists {
            result.message = "project not found".to_string();
            return Ok(result);
        }
        result.exists = true;

        let Some(technique) = self.select_technique(&project).await else {
            result.message = "unknown project type".to_string();
            return Err(Failure::new(
                result,
                DeployError::UnsupportedProject(project.name.clone()),
            ));
        };
        result.strategy = Some(technique);

        match technique.status(&project, &self.exec).await {
            Ok(running) => {
                result.running = running;
                result.message = "status retrieved".to_string();
                Ok(result)
            }
            Err(e) => {
                result.message = format!("{technique} status check failed");
                Err(Failure::new(result, e))
            }
        }
    }
}
