// ABOUTME: Shared helper for opening the SSH session and wiring an Orchestrator over it.
// ABOUTME: Eliminates duplication across the init, push, rollback, status, and logs commands.

use skiff::config::Config;
use skiff::deploy::{Orchestrator, RemoteLock};
use skiff::diagnostics::{Diagnostics, Warning};
use skiff::error::Result;
use skiff::output::Output;
use skiff::remote::ShellFileSystem;
use skiff::ssh::Session;

pub type SessionOrchestrator<'a> =
    Orchestrator<&'a Session, ShellFileSystem<&'a Session>, RemoteLock<&'a Session>>;

pub async fn connect(config: &Config, output: &Output) -> Result<Session> {
    output.progress(&format!("  → Connecting to {}...", config.ssh.host));
    let session = Session::connect(config.ssh.ssh_session_config()?).await?;
    Ok(session)
}

/// Build an orchestrator whose executor, filesystem, and lock all share one session.
pub fn orchestrator<'a>(config: &Config, session: &'a Session) -> SessionOrchestrator<'a> {
    Orchestrator::new(
        session,
        ShellFileSystem::new(session),
        RemoteLock::new(session).stale_after(config.lock.stale_after),
    )
    .layout(config.paths.clone())
    .registry(config.registry())
    .branch(config.branch.clone())
    .backup_selection(config.rollback.latest)
}

/// Close the session. Failure is non-fatal and recorded as a warning.
pub async fn disconnect(session: Session, diag: &mut Diagnostics) {
    let host = session.config().host.clone();
    if let Err(e) = session.disconnect().await {
        diag.warn(Warning::ssh_disconnect(format!(
            "SSH disconnect failed for {}: {}",
            host, e
        )));
    }
}

/// Emit warnings collected outside the pipeline itself.
pub fn flush_warnings(diag: Diagnostics, output: &Output) {
    for warning in diag.into_warnings() {
        output.warning(&warning.message);
    }
}
