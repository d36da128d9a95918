// ABOUTME: Result records returned by every pipeline call.
// ABOUTME: Always populated, including on failure, so callers can report what happened.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::diagnostics::Warning;
use crate::project::Project;
use crate::technique::Technique;

/// Outcome of provisioning a project on the remote host.
#[derive(Debug, Clone, Serialize)]
pub struct InitResult {
    pub project: Project,
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Outcome of a deployment.
#[derive(Debug, Clone, Serialize)]
pub struct DeployResult {
    pub project_name: String,
    pub success: bool,
    /// `deployed` on success, empty otherwise.
    pub status: String,
    pub message: String,
    /// Technique that ran, once one was selected.
    pub strategy: Option<Technique>,
    /// Archive written before the sources were updated.
    pub backup: Option<String>,
    pub log_file: String,
    pub timestamp: DateTime<Utc>,
    pub warnings: Vec<Warning>,
}

impl DeployResult {
    pub(crate) fn new(project: &Project, timestamp: DateTime<Utc>) -> Self {
        Self {
            project_name: project.name.to_string(),
            success: false,
            status: String::new(),
            message: String::new(),
            strategy: None,
            backup: None,
            log_file: project.log_file.clone(),
            timestamp,
            warnings: Vec::new(),
        }
    }
}

/// Outcome of restoring a backup.
#[derive(Debug, Clone, Serialize)]
pub struct RollbackResult {
    pub project_name: String,
    pub success: bool,
    /// Archive name that was extracted.
    pub restored: Option<String>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub warnings: Vec<Warning>,
}

impl RollbackResult {
    pub(crate) fn new(project: &Project, timestamp: DateTime<Utc>) -> Self {
        Self {
            project_name: project.name.to_string(),
            success: false,
            restored: None,
            message: String::new(),
            timestamp,
            warnings: Vec::new(),
        }
    }
}

/// Remote state of a project.
#[derive(Debug, Clone, Serialize)]
pub struct StatusResult {
    pub project_name: String,
    /// Whether the deploy directory exists.
    pub exists: bool,
    pub running: bool,
    pub strategy: Option<Technique>,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl StatusResult {
    pub(crate) fn new(project: &Project, timestamp: DateTime<Utc>) -> Self {
        Self {
            project_name: project.name.to_string(),
            exists: false,
            running: false,
            strategy: None,
            message: String::new(),
            timestamp,
        }
    }

    /// `running` or `stopped`.
    pub fn state(&self) -> &'static str {
        if self.running { "running" } else { "stopped" }
    }
}
