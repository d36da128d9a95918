// ABOUTME: Marker-file probes used to recognize a project's runtime shape.
// ABOUTME: Single, all-of, and any-of checks against files in the deploy directory.

use crate::project::Project;
use crate::remote::{RemoteError, RemoteFileSystem};

/// A marker-file check relative to the deploy directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Probe {
    /// Always matches. Used by the catch-all technique.
    Always,
    /// A single marker file.
    One(&'static str),
    /// Every marker must exist.
    All(&'static [&'static str]),
    /// At least one marker must exist.
    Any(&'static [&'static str]),
}

impl Probe {
    /// Evaluate the probe against a project's deploy directory.
    pub async fn matches<F>(&self, fs: &F, project: &Project) -> Result<bool, RemoteError>
    where
        F: RemoteFileSystem + ?Sized,
    {
        match self {
            Probe::Always => Ok(true),
            Probe::One(marker) => fs.exists(&project.deploy_path(marker)).await,
            Probe::All(markers) => fs.exists_all(&paths(project, markers)).await,
            Probe::Any(markers) => fs.exists_any(&paths(project, markers)).await,
        }
    }
}

fn paths(project: &Project, markers: &[&str]) -> Vec<String> {
    markers.iter().map(|m| project.deploy_path(m)).collect()
}
