// ABOUTME: Project naming and remote path derivation.
// ABOUTME: A Project is recreated from its name on every pipeline call, never stored.

mod layout;
mod name;

pub use layout::{
    DEFAULT_BACKUP_ROOT, DEFAULT_DEPLOY_ROOT, DEFAULT_LOCK_ROOT, DEFAULT_LOG_ROOT,
    DEFAULT_REPO_ROOT, Layout, Project, parent_dir,
};
pub use name::{MAX_LEN, ProjectName, ProjectNameError};
