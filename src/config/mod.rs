// ABOUTME: Configuration types and parsing for skiff.yml.
// ABOUTME: Handles file discovery, YAML parsing, and destination merging.

mod deserialize;
mod env_value;
mod init;
mod ssh;

pub use env_value::EnvValue;
pub use init::init_config;
pub use ssh::SshConfig;

use crate::deploy::{BackupSelection, DEFAULT_BRANCH, DEFAULT_STALE_AFTER};
use crate::error::{Error, Result};
use crate::project::Layout;
use crate::technique::{DEFAULT_REGISTRY, Technique};
use deserialize::{deserialize_ssh, deserialize_ssh_option};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "skiff.yml";
pub const CONFIG_FILENAME_ALT: &str = "skiff.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".skiff/config.yml";

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SKIFF_CONFIG";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_ssh")]
    pub ssh: SshConfig,

    #[serde(default = "default_branch")]
    pub branch: String,

    /// Remote root directories.
    #[serde(default)]
    pub paths: Layout,

    #[serde(default)]
    pub lock: LockConfig,

    #[serde(default)]
    pub rollback: RollbackConfig,

    /// Technique selection order. Defaults to the built-in registry.
    #[serde(default)]
    pub techniques: Option<Vec<Technique>>,

    #[serde(default)]
    pub destinations: HashMap<String, Destination>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Destination {
    #[serde(default, deserialize_with = "deserialize_ssh_option")]
    pub ssh: Option<SshConfig>,

    #[serde(default)]
    pub branch: Option<String>,

    #[serde(default)]
    pub paths: Option<Layout>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LockConfig {
    /// Age after which a lock file is considered abandoned.
    #[serde(default = "default_stale_after", with = "humantime_serde")]
    pub stale_after: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            stale_after: default_stale_after(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RollbackConfig {
    /// How the latest backup is picked when none is named.
    #[serde(default)]
    pub latest: BackupSelection,
}

fn default_branch() -> String {
    DEFAULT_BRANCH.to_string()
}

fn default_stale_after() -> Duration {
    DEFAULT_STALE_AFTER
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Find the config file: `$SKIFF_CONFIG` when set, otherwise the first of
    /// `skiff.yml`, `skiff.yaml`, `.skiff/config.yml` in `dir`.
    pub fn discover(dir: &Path) -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            let path = PathBuf::from(path);
            if !path.exists() {
                return Err(Error::ConfigNotFound(path));
            }
            return Self::load(&path);
        }

        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("Loading config from {}", path.display());
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    pub fn for_destination(&self, name: &str) -> Result<Config> {
        let dest = self
            .destinations
            .get(name)
            .ok_or_else(|| Error::UnknownDestination(name.to_string()))?;

        let mut merged = self.clone();

        if let Some(ref ssh) = dest.ssh {
            merged.ssh = ssh.clone();
        }

        if let Some(ref branch) = dest.branch {
            merged.branch = branch.clone();
        }

        if let Some(ref paths) = dest.paths {
            merged.paths = paths.clone();
        }

        merged.validate()?;
        Ok(merged)
    }

    /// Technique selection order in effect.
    pub fn registry(&self) -> Vec<Technique> {
        self.techniques
            .clone()
            .unwrap_or_else(|| DEFAULT_REGISTRY.to_vec())
    }

    fn validate(&self) -> Result<()> {
        if self.branch.trim().is_empty() {
            return Err(Error::InvalidConfig("branch cannot be empty".to_string()));
        }
        if let Some(techniques) = &self.techniques {
            validate_registry(techniques)?;
        }
        Ok(())
    }
}

/// The catch-all must appear exactly once and last, so every project resolves
/// a technique and no entry is shadowed by it.
fn validate_registry(techniques: &[Technique]) -> Result<()> {
    let Some((last, rest)) = techniques.split_last() else {
        return Err(Error::InvalidConfig(
            "techniques list cannot be empty".to_string(),
        ));
    };
    if *last != Technique::Static {
        return Err(Error::InvalidConfig(format!(
            "techniques list must end with '{}'",
            Technique::Static
        )));
    }
    if rest.contains(&Technique::Static) {
        return Err(Error::InvalidConfig(format!(
            "'{}' may only appear once, as the last technique",
            Technique::Static
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::from_yaml("ssh: deploy@example.com\n").unwrap();

        assert_eq!(config.ssh.host, "example.com");
        assert_eq!(config.ssh.user.as_deref(), Some("deploy"));
        assert_eq!(config.branch, "main");
        assert_eq!(config.paths, Layout::default());
        assert_eq!(config.lock.stale_after, Duration::from_secs(3600));
        assert_eq!(config.rollback.latest, BackupSelection::Lexical);
        assert_eq!(config.registry(), DEFAULT_REGISTRY.to_vec());
        assert!(!config.ssh.trust_first_connection);
    }

    #[test]
    fn parses_detailed_ssh_and_durations() {
        let yaml = r#"
ssh:
  host: example.com
  port: 2222
  user: deploy
  key_path: ~/.ssh/deploy_ed25519
  command_timeout: 5m
lock:
  stale_after: 30m
rollback:
  latest: chronological
"#;
        let config = Config::from_yaml(yaml).unwrap();

        assert_eq!(config.ssh.port, 2222);
        assert_eq!(config.ssh.command_timeout, Some(Duration::from_secs(300)));
        assert_eq!(config.lock.stale_after, Duration::from_secs(1800));
        assert_eq!(config.rollback.latest, BackupSelection::Chronological);
    }

    #[test]
    fn custom_registry_order() {
        let yaml = "ssh: example.com\ntechniques: [node, static]\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.registry(), vec![Technique::Node, Technique::Static]);
    }

    #[test]
    fn rejects_empty_registry() {
        let err = Config::from_yaml("ssh: example.com\ntechniques: []\n").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn rejects_unknown_technique() {
        let err = Config::from_yaml("ssh: example.com\ntechniques: [rails]\n").unwrap_err();
        assert!(matches!(err, Error::Yaml(_)));
    }

    #[test]
    fn partial_paths_keep_other_defaults() {
        let yaml = "ssh: example.com\npaths:\n  deploy_root: /srv/apps\n";
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(config.paths.deploy_root, "/srv/apps");
        assert_eq!(config.paths.repo_root, "/var/repo");
    }

    #[test]
    fn destination_overrides_ssh_and_branch() {
        let yaml = r#"
ssh: deploy@prod.example.com
destinations:
  staging:
    ssh: deploy@staging.example.com:2200
    branch: develop
"#;
        let config = Config::from_yaml(yaml).unwrap();
        let staging = config.for_destination("staging").unwrap();

        assert_eq!(staging.ssh.host, "staging.example.com");
        assert_eq!(staging.ssh.port, 2200);
        assert_eq!(staging.branch, "develop");
        assert_eq!(config.branch, "main");
    }

    #[test]
    fn unknown_destination_is_an_error() {
        let config = Config::from_yaml("ssh: example.com\n").unwrap();
        let err = config.for_destination("nope").unwrap_err();
        assert!(matches!(err, Error::UnknownDestination(name) if name == "nope"));
    }
}
