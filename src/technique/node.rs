// ABOUTME: Node.js technique managed by pm2.
// ABOUTME: Installs production dependencies and runs the app as a pm2 process named after the project.

use super::{Probe, in_deploy_dir};
use crate::project::Project;
use crate::remote::{RemoteError, RemoteExecutor};
use crate::shell::escape;

pub(super) const PROBE: Probe = Probe::One("package.json");

pub(super) async fn deploy<E: RemoteExecutor + ?Sized>(
    project: &Project,
    exec: &E,
) -> Result<(), RemoteError> {
    let name = escape(project.name.as_str());
    exec.run(&in_deploy_dir(
        project,
        &format!(
            "npm install --production && (pm2 restart {name} || pm2 start npm --name {name} -- start)"
        ),
    ))
    .await?;
    Ok(())
}

pub(super) async fn restart<E: RemoteExecutor + ?Sized>(
    project: &Project,
    exec: &E,
) -> Result<(), RemoteError> {
    exec.run(&format!("pm2 restart {}", escape(project.name.as_str())))
        .await?;
    Ok(())
}

pub(super) async fn status<E: RemoteExecutor + ?Sized>(
    project: &Project,
    exec: &E,
) -> Result<bool, RemoteError> {
    let out = exec
        .run(&format!("pm2 describe {}", escape(project.name.as_str())))
        .await?;
    Ok(out.contains("online"))
}
