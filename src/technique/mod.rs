// ABOUTME: Deployment techniques and first-match selection.
// ABOUTME: Maps a project's remote file markers to the way it is deployed, restarted, and inspected.

mod docker;
mod laravel;
mod node;
mod probe;
mod python;

pub use probe::Probe;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::project::Project;
use crate::remote::{RemoteError, RemoteExecutor, RemoteFileSystem};
use crate::shell::escape;

/// A runtime shape a project can have, and how to deploy it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Technique {
    /// Docker Compose services.
    Docker,
    /// Node.js app under pm2.
    Node,
    /// Laravel app under php-fpm.
    Laravel,
    /// Python service under systemd.
    Python,
    /// Catch-all: always matches, every action is a no-op.
    Static,
}

/// Selection order used when none is configured.
///
/// Order matters: a project with both a compose file and a `package.json`
/// deploys with Docker. [`Technique::Static`] stays last so selection always
/// resolves.
pub const DEFAULT_REGISTRY: [Technique; 5] = [
    Technique::Docker,
    Technique::Node,
    Technique::Laravel,
    Technique::Python,
    Technique::Static,
];

impl Technique {
    pub fn name(&self) -> &'static str {
        match self {
            Technique::Docker => "docker",
            Technique::Node => "node",
            Technique::Laravel => "laravel",
            Technique::Python => "python",
            Technique::Static => "static",
        }
    }

    /// Marker files that identify this technique.
    pub fn probe(&self) -> Probe {
        match self {
            Technique::Docker => docker::PROBE,
            Technique::Node => node::PROBE,
            Technique::Laravel => laravel::PROBE,
            Technique::Python => python::PROBE,
            Technique::Static => Probe::Always,
        }
    }

    pub async fn detect<F>(&self, fs: &F, project: &Project) -> Result<bool, RemoteError>
    where
        F: RemoteFileSystem + ?Sized,
    {
        self.probe().matches(fs, project).await
    }

    pub async fn deploy<E>(&self, project: &Project, exec: &E) -> Result<(), RemoteError>
    where
        E: RemoteExecutor + ?Sized,
    {
        match self {
            Technique::Docker => docker::deploy(project, exec).await,
            Technique::Node => node::deploy(project, exec).await,
            Technique::Laravel => laravel::deploy(project, exec).await,
            Technique::Python => python::deploy(project, exec).await,
            Technique::Static => Ok(()),
        }
    }

    pub async fn restart<E>(&self, project: &Project, exec: &E) -> Result<(), RemoteError>
    where
        E: RemoteExecutor + ?Sized,
    {
        match self {
            Technique::Docker => docker::restart(project, exec).await,
            Technique::Node => node::restart(project, exec).await,
            Technique::Laravel => laravel::restart(project, exec).await,
            Technique::Python => python::restart(project, exec).await,
            Technique::Static => Ok(()),
        }
    }

    /// Whether the deployed application is currently running.
    pub async fn status<E>(&self, project: &Project, exec: &E) -> Result<bool, RemoteError>
    where
        E: RemoteExecutor + ?Sized,
    {
        match self {
            Technique::Docker => docker::status(project, exec).await,
            Technique::Node => node::status(project, exec).await,
            Technique::Laravel => laravel::status(project, exec).await,
            Technique::Python => python::status(project, exec).await,
            Technique::Static => Ok(true),
        }
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pick the first technique in `registry` whose probe matches.
///
/// A probe that errors counts as a non-match, so one broken check can't
/// block selection.
pub async fn select<F>(registry: &[Technique], fs: &F, project: &Project) -> Option<Technique>
where
    F: RemoteFileSystem + ?Sized,
{
    for technique in registry {
        match technique.detect(fs, project).await {
            Ok(true) => {
                tracing::debug!("{} matched technique {}", project.name, technique);
                return Some(*technique);
            }
            Ok(false) => {}
            Err(e) => {
                tracing::debug!(
                    "{} probe failed for {}, treating as no match: {}",
                    technique,
                    project.name,
                    e
                );
            }
        }
    }
    None
}

/// Prefix a command with a change into the project's deploy directory.
fn in_deploy_dir(project: &Project, command: &str) -> String {
    format!("cd {} && {}", escape(&project.deploy_dir), command)
}

/// Ask systemd whether a unit is active.
///
/// `|| true` keeps an inactive unit from surfacing as a command failure;
/// the state word is compared exactly so `inactive` never reads as running.
async fn unit_is_active<E>(exec: &E, unit: &str) -> Result<bool, RemoteError>
where
    E: RemoteExecutor + ?Sized,
{
    let out = exec
        .run(&format!("systemctl is-active {} || true", escape(unit)))
        .await?;
    Ok(out.lines().next().map(str::trim) == Some("active"))
}
