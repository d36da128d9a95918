// ABOUTME: SSH target configuration for the deploy host.
// ABOUTME: Parses formats like "host", "user@host", "host:port", "user@host:port".

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::EnvValue;
use crate::error::{Error, Result};
use crate::ssh::SessionConfig;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SshConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub key_path: Option<PathBuf>,
    #[serde(default)]
    pub password: Option<EnvValue>,
    #[serde(default)]
    pub known_hosts_path: Option<PathBuf>,
    #[serde(default)]
    pub trust_first_connection: bool,
    #[serde(default, with = "humantime_serde")]
    pub command_timeout: Option<Duration>,
}

fn default_port() -> u16 {
    22
}

impl SshConfig {
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("ssh address cannot be empty".to_string());
        }

        // [user@]host[:port]
        let (user_part, rest) = match s.split_once('@') {
            Some((user, rest)) => (Some(user), rest),
            None => (None, s),
        };

        let (host, port) = if let Some((host, port_str)) = rest.rsplit_once(':') {
            let port = port_str
                .parse::<u16>()
                .map_err(|_| format!("invalid port: {}", port_str))?;
            (host, port)
        } else {
            (rest, default_port())
        };

        if host.is_empty() {
            return Err("hostname cannot be empty".to_string());
        }
        if user_part.is_some_and(str::is_empty) {
            return Err("username cannot be empty".to_string());
        }

        Ok(SshConfig {
            host: host.to_string(),
            port,
            user: user_part.map(str::to_string),
            key_path: None,
            password: None,
            known_hosts_path: None,
            trust_first_connection: false,
            command_timeout: None,
        })
    }

    /// Remote user, falling back to the local `$USER`.
    pub fn user(&self) -> Result<String> {
        match &self.user {
            Some(user) => Ok(user.clone()),
            None => std::env::var("USER").map_err(|_| Error::MissingEnvVar("USER".to_string())),
        }
    }

    /// Build the session settings, resolving the password from the
    /// environment when it is given as a reference.
    pub fn ssh_session_config(&self) -> Result<SessionConfig> {
        let mut config = SessionConfig::new(&self.host, self.user()?)
            .port(self.port)
            .trust_on_first_use(self.trust_first_connection)
            .command_timeout(self.command_timeout);

        if let Some(path) = &self.key_path {
            config = config.key_path(path);
        }
        if let Some(path) = &self.known_hosts_path {
            config = config.known_hosts_path(path);
        }
        if let Some(password) = &self.password {
            config = config.password(password.resolve()?);
        }

        Ok(config)
    }
}
