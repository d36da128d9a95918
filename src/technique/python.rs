// ABOUTME: Python service technique backed by a systemd unit named after the project.
// ABOUTME: Installs requirements when present; restart and status go through systemctl.

use super::{Probe, in_deploy_dir, unit_is_active};
use crate::project::Project;
use crate::remote::{RemoteError, RemoteExecutor};
use crate::shell::escape;

pub(super) const PROBE: Probe = Probe::Any(&["requirements.txt", "pyproject.toml"]);

pub(super) async fn deploy<E: RemoteExecutor + ?Sized>(
    project: &Project,
    exec: &E,
) -> Result<(), RemoteError> {
    exec.run(&in_deploy_dir(
        project,
        "if [ -f requirements.txt ]; then pip install -r requirements.txt; fi",
    ))
    .await?;
    Ok(())
}

pub(super) async fn restart<E: RemoteExecutor + ?Sized>(
    project: &Project,
    exec: &E,
) -> Result<(), RemoteError> {
    exec.run(&format!(
        "systemctl restart {} || true",
        escape(project.name.as_str())
    ))
    .await?;
    Ok(())
}

pub(super) async fn status<E: RemoteExecutor + ?Sized>(
    project: &Project,
    exec: &E,
) -> Result<bool, RemoteError> {
    unit_is_active(exec, project.name.as_str()).await
}
