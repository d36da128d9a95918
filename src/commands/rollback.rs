// ABOUTME: Rollback command implementation.
// ABOUTME: Restores a project from a named or the latest backup archive.

use super::connection::{connect, disconnect, flush_warnings, orchestrator};
use super::report;
use skiff::config::Config;
use skiff::diagnostics::Diagnostics;
use skiff::error::Result;
use skiff::output::Output;
use skiff::project::ProjectName;

pub async fn rollback(
    config: &Config,
    name: &ProjectName,
    backup: Option<&str>,
    mut output: Output,
) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();

    let session = connect(config, &output).await?;
    output.progress(&format!("  → Rolling back {}...", name));
    let outcome = orchestrator(config, &session).rollback(name, backup).await;
    disconnect(session, &mut diag).await;
    flush_warnings(diag, &output);

    let result = report(&output, outcome)?;
    output.success(&result.message);
    Ok(())
}
