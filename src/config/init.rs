// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates skiff.yml template files.

use std::path::Path;

use crate::error::{Error, Result};

use super::{CONFIG_FILENAME, SshConfig};

pub fn init_config(dir: &Path, host: Option<&str>, user: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let host = host.unwrap_or("deploy.example.com");
    let user = user.unwrap_or("deploy");
    let target = format!("{user}@{host}");
    SshConfig::parse(&target).map_err(Error::InvalidConfig)?;

    std::fs::write(&config_path, generate_template_yaml(host, user))?;
    Ok(())
}

fn generate_template_yaml(host: &str, user: &str) -> String {
    format!(
        r#"ssh:
  host: {host}
  port: 22
  user: {user}
  # SSH host key verification (default: false for security)
  # Set to true to enable Trust-On-First-Use, or pre-populate ~/.ssh/known_hosts
  # trust_first_connection: true
  # command_timeout: 10m

branch: main

# Remote root directories; each project gets its own entry under each root.
# paths:
#   repo_root: /var/repo
#   deploy_root: /var/www
#   backup_root: /var/backups
#   lock_root: /var/locks
#   log_root: /var/log/deploy

# lock:
#   stale_after: 60m   # whole minutes; partial minutes round up

# rollback:
#   latest: lexical   # or: chronological

# Selection order; must end with the catch-all 'static'.
# techniques: [docker, node, laravel, python, static]

# destinations:
#   staging:
#     ssh: deploy@staging.example.com
#     branch: develop
"#
    )
}
