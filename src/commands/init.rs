// ABOUTME: Init command implementation.
// ABOUTME: Provisions a project's remote directories and bare repository.

use super::connection::{connect, disconnect, flush_warnings, orchestrator};
use super::report;
use skiff::config::Config;
use skiff::diagnostics::Diagnostics;
use skiff::error::Result;
use skiff::output::Output;
use skiff::project::ProjectName;

pub async fn init(config: &Config, name: &ProjectName, mut output: Output) -> Result<()> {
    output.start_timer();
    let mut diag = Diagnostics::default();

    let session = connect(config, &output).await?;
    output.progress(&format!("  → Initializing {}...", name));
    let outcome = orchestrator(config, &session).init(name).await;
    disconnect(session, &mut diag).await;
    flush_warnings(diag, &output);

    let result = report(&output, outcome)?;
    output.progress(&format!("  → Push target: {}", result.project.repo_path));
    output.success(&result.message);
    Ok(())
}
