// ABOUTME: Push command implementation.
// ABOUTME: Snapshots, updates, and redeploys a project on the remote host.

use super::connection::{connect, disconnect, flush_warnings, orchestrator};
use super::report;
use skiff::config::Config;
use skiff::diagnostics::Diagnostics;
use skiff::error::Result;
use skiff::output::Output;
use skiff::project::ProjectName;

pub async fn push(config: &Config, name: &ProjectName, mut output: Output) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();

    let session = connect(config, &output).await?;
    output.progress(&format!(
        "  → Deploying {} from branch {}...",
        name, config.branch
    ));
    let outcome = orchestrator(config, &session).deploy(name).await;
    disconnect(session, &mut diag).await;
    flush_warnings(diag, &output);

    let result = report(&output, outcome)?;
    if let Some(backup) = &result.backup {
        output.progress(&format!("  → Backup: {}", backup));
    }
    output.success(&result.message);
    Ok(())
}
