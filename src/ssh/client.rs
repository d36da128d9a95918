// ABOUTME: SSH session management using russh.
// ABOUTME: Handles connection, authentication, and buffered or streamed command execution.

use super::error::{Error, Result};
use russh::client::{self, Config, Handle};
use russh::keys::agent::client::AgentClient;
use russh::keys::known_hosts::{
    check_known_hosts, check_known_hosts_path, learn_known_hosts, learn_known_hosts_path,
};
use russh::keys::{PrivateKeyWithHashAlg, load_secret_key, ssh_key};
use russh::{Channel, ChannelMsg, Disconnect};
use std::future::Future;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::UnixStream;

/// Configuration for establishing an SSH session.
#[derive(Clone)]
pub struct SessionConfig {
    /// Remote host to connect to.
    pub host: String,
    /// SSH port (default: 22).
    pub port: u16,
    /// Username for authentication.
    pub user: String,
    /// Optional path to private key file.
    /// If None, tries the password, then the SSH agent, then default key locations.
    pub key_path: Option<PathBuf>,
    /// Optional password, used when no key file is configured or key auth is rejected.
    pub password: Option<String>,
    /// Whether to accept unknown hosts (Trust On First Use).
    /// If false, connection to unknown hosts will fail.
    pub trust_on_first_use: bool,
    /// Optional path to known_hosts file.
    /// If None, uses the default ~/.ssh/known_hosts.
    pub known_hosts_path: Option<PathBuf>,
    /// Timeout for a single command. None waits indefinitely.
    pub command_timeout: Option<Duration>,
    /// Timeout for establishing the connection (default: 15 seconds).
    pub connect_timeout: Duration,
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("key_path", &self.key_path)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("trust_on_first_use", &self.trust_on_first_use)
            .field("known_hosts_path", &self.known_hosts_path)
            .field("command_timeout", &self.command_timeout)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

impl SessionConfig {
    pub fn new(host: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            user: user.into(),
            key_path: None,
            password: None,
            trust_on_first_use: false,
            known_hosts_path: None,
            command_timeout: None,
            connect_timeout: Duration::from_secs(15),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.key_path = Some(path.into());
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn trust_on_first_use(mut self, tofu: bool) -> Self {
        self.trust_on_first_use = tofu;
        self
    }

    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    pub fn command_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.command_timeout = timeout;
        self
    }
}

/// Output from a remote command execution.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Exit code of the command.
    pub exit_code: u32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stdout followed by stderr, the way a terminal user would see them.
    pub fn combined(&self) -> String {
        let mut out = self.stdout.clone();
        out.push_str(&self.stderr);
        out
    }
}

/// SSH client handler for russh.
pub(crate) struct SshHandler {
    host: String,
    port: u16,
    trust_on_first_use: bool,
    known_hosts_path: Option<PathBuf>,
}

impl SshHandler {
    fn new(
        host: String,
        port: u16,
        trust_on_first_use: bool,
        known_hosts_path: Option<PathBuf>,
    ) -> Self {
        Self {
            host,
            port,
            trust_on_first_use,
            known_hosts_path,
        }
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        let check_result = match &self.known_hosts_path {
            Some(path) => check_known_hosts_path(&self.host, self.port, server_public_key, path),
            None => check_known_hosts(&self.host, self.port, server_public_key),
        };

        match check_result {
            Ok(true) => Ok(true),
            Ok(false) => {
                // Host not in known_hosts
                if self.trust_on_first_use {
                    tracing::warn!(
                        "Trust-On-First-Use: accepting unknown host key for {}:{}",
                        self.host,
                        self.port
                    );
                    let learn_result = match &self.known_hosts_path {
                        Some(path) => {
                            learn_known_hosts_path(&self.host, self.port, server_public_key, path)
                        }
                        None => learn_known_hosts(&self.host, self.port, server_public_key),
                    };
                    if let Err(e) = learn_result {
                        tracing::warn!("Failed to save host key to known_hosts: {}", e);
                    }
                    Ok(true)
                } else {
                    tracing::error!(
                        "Host key for {}:{} is not in known_hosts",
                        self.host,
                        self.port
                    );
                    Ok(false)
                }
            }
            Err(russh::keys::Error::KeyChanged { .. }) => {
                tracing::error!("Host key for {}:{} has changed", self.host, self.port);
                Ok(false)
            }
            Err(_) => Ok(self.trust_on_first_use),
        }
    }
}

/// Authentication method resolved from config.
enum AuthMethod {
    Agent(AgentClient<UnixStream>),
    KeyFile(Arc<ssh_key::PrivateKey>),
    Password(String),
}

/// An established SSH session.
pub struct Session {
    config: SessionConfig,
    handle: Handle<SshHandler>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("config", &self.config)
            .field("handle", &"<russh::Handle>")
            .finish()
    }
}

impl Session {
    /// Connect to the remote host.
    pub async fn connect(config: SessionConfig) -> Result<Self> {
        let auth_method = Self::resolve_auth_method(&config).await?;

        let russh_config = Config {
            inactivity_timeout: None,
            keepalive_interval: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        let handler = SshHandler::new(
            config.host.clone(),
            config.port,
            config.trust_on_first_use,
            config.known_hosts_path.clone(),
        );

        tracing::debug!("Connecting to {}@{}:{}", config.user, config.host, config.port);

        let connect = client::connect(
            Arc::new(russh_config),
            (config.host.as_str(), config.port),
            handler,
        );
        let mut session = tokio::time::timeout(config.connect_timeout, connect)
            .await
            .map_err(|_| {
                Error::Connection(format!(
                    "timed out connecting to {}:{}",
                    config.host, config.port
                ))
            })?
            .map_err(|e| {
                if e.to_string().contains("Connection refused") {
                    Error::Connection(format!(
                        "connection refused to {}:{}",
                        config.host, config.port
                    ))
                } else {
                    Error::Connection(e.to_string())
                }
            })?;

        let mut auth_success = Self::authenticate(&mut session, &config, auth_method).await?;

        // A rejected key still leaves the password as a fallback.
        if !auth_success
            && config.key_path.is_some()
            && let Some(password) = config.password.clone()
        {
            auth_success =
                Self::authenticate(&mut session, &config, AuthMethod::Password(password)).await?;
        }

        if !auth_success {
            return Err(Error::AuthenticationFailed);
        }

        Ok(Self {
            config,
            handle: session,
        })
    }

    /// Resolve which authentication method to use.
    async fn resolve_auth_method(config: &SessionConfig) -> Result<AuthMethod> {
        if let Some(key_path) = &config.key_path {
            let key = load_secret_key(key_path, None).map_err(|e| Error::KeyLoadFailed {
                path: key_path.clone(),
                reason: e.to_string(),
            })?;
            return Ok(AuthMethod::KeyFile(Arc::new(key)));
        }

        if let Some(password) = &config.password {
            return Ok(AuthMethod::Password(password.clone()));
        }

        if let Ok(agent) = AgentClient::connect_env().await {
            return Ok(AuthMethod::Agent(agent));
        }

        let home = std::env::var("HOME").map_err(|_| {
            Error::AgentUnavailable("SSH agent not available and HOME not set".to_string())
        })?;

        let default_keys = [
            format!("{}/.ssh/id_ed25519", home),
            format!("{}/.ssh/id_rsa", home),
            format!("{}/.ssh/id_ecdsa", home),
        ];

        for key_path in &default_keys {
            if let Ok(key) = load_secret_key(key_path, None) {
                return Ok(AuthMethod::KeyFile(Arc::new(key)));
            }
        }

        Err(Error::AgentUnavailable(
            "SSH agent not available and no default keys found".to_string(),
        ))
    }

    /// Authenticate the session.
    async fn authenticate(
        session: &mut Handle<SshHandler>,
        config: &SessionConfig,
        auth_method: AuthMethod,
    ) -> Result<bool> {
        match auth_method {
            AuthMethod::Agent(mut agent) => {
                let keys = agent.request_identities().await.map_err(|e| {
                    Error::AgentUnavailable(format!("failed to list agent keys: {}", e))
                })?;

                if keys.is_empty() {
                    return Err(Error::AgentUnavailable("no keys in SSH agent".to_string()));
                }

                for key in &keys {
                    match session
                        .authenticate_publickey_with(&config.user, key.clone(), None, &mut agent)
                        .await
                    {
                        Ok(result) if result.success() => return Ok(true),
                        _ => continue,
                    }
                }
                Ok(false)
            }
            AuthMethod::KeyFile(key) => {
                let hash_alg = session
                    .best_supported_rsa_hash()
                    .await
                    .map_err(Error::Protocol)?
                    .flatten();

                let result = session
                    .authenticate_publickey(&config.user, PrivateKeyWithHashAlg::new(key, hash_alg))
                    .await
                    .map_err(Error::Protocol)?;

                Ok(result.success())
            }
            AuthMethod::Password(password) => {
                let result = session
                    .authenticate_password(&config.user, password)
                    .await
                    .map_err(Error::Protocol)?;

                Ok(result.success())
            }
        }
    }

    /// The configuration this session was opened with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Execute a command on the remote host and buffer its output.
    pub async fn exec(&self, command: &str) -> Result<CommandOutput> {
        self.with_timeout(self.exec_inner(command)).await
    }

    /// Execute a command, writing stdout and stderr to `sink` as they arrive.
    ///
    /// Returns the exit code.
    pub async fn exec_streaming(
        &self,
        command: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u32> {
        self.with_timeout(self.exec_streaming_inner(command, sink))
            .await
    }

    async fn with_timeout<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match self.config.command_timeout {
            Some(timeout) => match tokio::time::timeout(timeout, fut).await {
                Ok(result) => result,
                Err(_) => Err(Error::CommandTimeout(timeout)),
            },
            None => fut.await,
        }
    }

    async fn open_exec(&self, command: &str) -> Result<Channel<client::Msg>> {
        tracing::debug!("exec: {}", command);

        let channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to open channel: {}", e)))?;

        channel
            .exec(true, command)
            .await
            .map_err(|e| Error::CommandFailed(format!("failed to exec command: {}", e)))?;

        Ok(channel)
    }

    async fn exec_inner(&self, command: &str) -> Result<CommandOutput> {
        let mut channel = self.open_exec(command).await?;
        let mut exit = ChannelExit::default();

        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        while let Some((data, ext)) = next_chunk(&mut channel, &mut exit).await {
            match ext {
                None => stdout.extend_from_slice(&data),
                Some(1) => stderr.extend_from_slice(&data),
                Some(_) => {}
            }
        }

        Ok(CommandOutput {
            exit_code: exit.finish()?,
            stdout: String::from_utf8_lossy(&stdout).to_string(),
            stderr: String::from_utf8_lossy(&stderr).to_string(),
        })
    }

    async fn exec_streaming_inner(
        &self,
        command: &str,
        sink: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<u32> {
        let mut channel = self.open_exec(command).await?;
        let mut exit = ChannelExit::default();

        while let Some((data, ext)) = next_chunk(&mut channel, &mut exit).await {
            if matches!(ext, None | Some(1)) {
                sink.write_all(&data).await?;
                sink.flush().await?;
            }
        }

        exit.finish()
    }

    /// Disconnect the session.
    pub async fn disconnect(self) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(Error::Protocol)?;
        Ok(())
    }
}

/// Exit bookkeeping for a running exec channel.
#[derive(Debug, Default)]
struct ChannelExit {
    code: Option<u32>,
    eof: bool,
    closed: bool,
}

impl ChannelExit {
    fn done(&self) -> bool {
        self.closed || (self.eof && self.code.is_some())
    }

    /// No exit status means the channel died underneath the command
    /// (connection drop, server-side kill).
    fn finish(self) -> Result<u32> {
        self.code.ok_or(Error::ChannelClosed)
    }
}

/// Next output chunk with its extended-data stream id (`None` for stdout,
/// `Some(1)` for stderr), or `None` once the command has exited and its
/// output is drained.
async fn next_chunk(
    channel: &mut Channel<client::Msg>,
    exit: &mut ChannelExit,
) -> Option<(impl Deref<Target = [u8]>, Option<u32>)> {
    while !exit.done() {
        match channel.wait().await {
            Some(ChannelMsg::Data { data }) => return Some((data, None)),
            Some(ChannelMsg::ExtendedData { data, ext }) => return Some((data, Some(ext))),
            Some(ChannelMsg::ExitStatus { exit_status }) => exit.code = Some(exit_status),
            Some(ChannelMsg::Eof) => exit.eof = true,
            Some(ChannelMsg::Close) | None => exit.closed = true,
            Some(_) => {}
        }
    }
    None
}
