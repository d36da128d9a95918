// ABOUTME: Orchestrator wiring the remote collaborators, lock, and technique registry together.
// ABOUTME: Pipelines (init, deploy, rollback, status, logs) are implemented on it in sibling modules.

use super::backup::BackupSelection;
use super::lock::LockManager;
use crate::project::{Layout, Project, ProjectName};
use crate::remote::{RemoteExecutor, RemoteFileSystem};
use crate::technique::{self, DEFAULT_REGISTRY, Technique};

/// Branch deployed when none is configured.
pub const DEFAULT_BRANCH: &str = "main";

/// Runs deployment pipelines against one remote host.
///
/// Every pipeline derives the project's paths fresh from the layout, issues
/// remote steps one at a time, and stops at the first failing step.
#[derive(Debug)]
pub struct Orchestrator<E, F, L> {
    pub(super) exec: E,
    pub(super) fs: F,
    pub(super) lock: L,
    pub(super) layout: Layout,
    pub(super) registry: Vec<Technique>,
    pub(super) branch: String,
    pub(super) backup_selection: BackupSelection,
}

impl<E, F, L> Orchestrator<E, F, L>
where
    E: RemoteExecutor,
    F: RemoteFileSystem,
    L: LockManager,
{
    pub fn new(exec: E, fs: F, lock: L) -> Self {
        Self {
            exec,
            fs,
            lock,
            layout: Layout::default(),
            registry: DEFAULT_REGISTRY.to_vec(),
            branch: DEFAULT_BRANCH.to_string(),
            backup_selection: BackupSelection::default(),
        }
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Replace the technique registry. Order is selection priority.
    pub fn registry(mut self, registry: Vec<Technique>) -> Self {
        self.registry = registry;
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn backup_selection(mut self, selection: BackupSelection) -> Self {
        self.backup_selection = selection;
        self
    }

    /// Paths for a project under the configured layout.
    pub fn project(&self, name: &ProjectName) -> Project {
        self.layout.project(name)
    }

    pub fn lock_manager(&self) -> &L {
        &self.lock
    }

    pub(super) async fn select_technique(&self, project: &Project) -> Option<Technique> {
        technique::select(&self.registry, &self.fs, project).await
    }
}
