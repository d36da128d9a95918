// ABOUTME: Remote directory layout and per-project path derivation.
// ABOUTME: Maps a project name to its repository, deploy, backup, lock, and log paths.

use serde::{Deserialize, Serialize};

use super::ProjectName;

pub const DEFAULT_REPO_ROOT: &str = "/var/repo";
pub const DEFAULT_DEPLOY_ROOT: &str = "/var/www";
pub const DEFAULT_BACKUP_ROOT: &str = "/var/backups";
pub const DEFAULT_LOCK_ROOT: &str = "/var/locks";
pub const DEFAULT_LOG_ROOT: &str = "/var/log/deploy";

/// Root directories on the remote host under which project paths are derived.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Layout {
    #[serde(default = "default_repo_root")]
    pub repo_root: String,
    #[serde(default = "default_deploy_root")]
    pub deploy_root: String,
    #[serde(default = "default_backup_root")]
    pub backup_root: String,
    #[serde(default = "default_lock_root")]
    pub lock_root: String,
    #[serde(default = "default_log_root")]
    pub log_root: String,
}

fn default_repo_root() -> String {
    DEFAULT_REPO_ROOT.to_string()
}

fn default_deploy_root() -> String {
    DEFAULT_DEPLOY_ROOT.to_string()
}

fn default_backup_root() -> String {
    DEFAULT_BACKUP_ROOT.to_string()
}

fn default_lock_root() -> String {
    DEFAULT_LOCK_ROOT.to_string()
}

fn default_log_root() -> String {
    DEFAULT_LOG_ROOT.to_string()
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            repo_root: default_repo_root(),
            deploy_root: default_deploy_root(),
            backup_root: default_backup_root(),
            lock_root: default_lock_root(),
            log_root: default_log_root(),
        }
    }
}

impl Layout {
    /// Derive the canonical remote paths for a project.
    pub fn project(&self, name: &ProjectName) -> Project {
        Project {
            name: name.clone(),
            repo_path: join(&self.repo_root, &format!("{name}.git")),
            deploy_dir: join(&self.deploy_root, name.as_str()),
            backup_dir: join(&self.backup_root, name.as_str()),
            lock_file: join(&self.lock_root, &format!("{name}.lock")),
            log_file: join(&self.log_root, &format!("{name}.log")),
        }
    }
}

fn join(root: &str, leaf: &str) -> String {
    let root = root.trim_end_matches('/');
    format!("{root}/{leaf}")
}

/// A deployable project and the remote paths that belong to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    #[serde(serialize_with = "serialize_name")]
    pub name: ProjectName,
    /// Bare repository used as the push target.
    pub repo_path: String,
    /// Checked-out working tree the application runs from.
    pub deploy_dir: String,
    pub backup_dir: String,
    pub lock_file: String,
    pub log_file: String,
}

impl Project {
    /// Full path of a file inside the deploy directory.
    pub fn deploy_path(&self, file: &str) -> String {
        join(&self.deploy_dir, file)
    }

    /// Full path of an archive inside the backup directory.
    pub fn backup_path(&self, archive: &str) -> String {
        join(&self.backup_dir, archive)
    }
}

fn serialize_name<S>(name: &ProjectName, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(name.as_str())
}

/// Parent directory of a remote path, or `/` for top-level entries.
pub fn parent_dir(path: &str) -> &str {
    match path.trim_end_matches('/').rfind('/') {
        Some(0) | None => "/",
        Some(idx) => &path[..idx],
    }
}
