// ABOUTME: Docker Compose technique.
// ABOUTME: Rebuilds and restarts every service defined in the project's compose file.

use super::{Probe, in_deploy_dir};
use crate::project::Project;
use crate::remote::{RemoteError, RemoteExecutor};

pub(super) const PROBE: Probe = Probe::Any(&["docker-compose.yml", "compose.yml"]);

pub(super) async fn deploy<E: RemoteExecutor + ?Sized>(
    project: &Project,
    exec: &E,
) -> Result<(), RemoteError> {
    exec.run(&in_deploy_dir(
        project,
        "docker compose down && docker compose up -d --build",
    ))
    .await?;
    Ok(())
}

pub(super) async fn restart<E: RemoteExecutor + ?Sized>(
    project: &Project,
    exec: &E,
) -> Result<(), RemoteError> {
    exec.run(&in_deploy_dir(project, "docker compose restart"))
        .await?;
    Ok(())
}

/// Running when at least one service container is in the running state.
pub(super) async fn status<E: RemoteExecutor + ?Sized>(
    project: &Project,
    exec: &E,
) -> Result<bool, RemoteError> {
    let out = exec
        .run(&in_deploy_dir(
            project,
            "docker compose ps --status running --quiet",
        ))
        .await?;
    Ok(out.lines().any(|line| !line.trim().is_empty()))
}
