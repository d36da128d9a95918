// ABOUTME: Status command implementation.
// ABOUTME: Reports whether a project is running and who holds its deploy lock.

use super::connection::{connect, disconnect, flush_warnings, orchestrator};
use super::report;
use serde::Serialize;
use skiff::config::Config;
use skiff::deploy::{LockInfo, LockManager};
use skiff::diagnostics::Diagnostics;
use skiff::error::Result;
use skiff::output::Output;
use skiff::project::ProjectName;

#[derive(Serialize)]
struct LockReport {
    project_name: String,
    lock: Option<LockInfo>,
}

pub async fn status(config: &Config, name: &ProjectName, output: Output) -> Result<()> {
    let mut diag = Diagnostics::default();

    let session = connect(config, &output).await?;
    let pipelines = orchestrator(config, &session);
    let outcome = pipelines.status(name).await;
    let holder = match pipelines
        .lock_manager()
        .holder(&pipelines.project(name))
        .await
    {
        Ok(holder) => holder,
        Err(e) => {
            tracing::warn!("Could not read lock for {}: {}", name, e);
            None
        }
    };
    drop(pipelines);
    disconnect(session, &mut diag).await;
    flush_warnings(diag, &output);

    let result = report(&output, outcome)?;
    output.record(&LockReport {
        project_name: result.project_name.clone(),
        lock: holder.clone(),
    });

    if !result.exists {
        output.success(&format!("{}: {}", name, result.message));
        return Ok(());
    }

    let strategy = result
        .strategy
        .map(|t| t.to_string())
        .unwrap_or_else(|| "unknown".to_string());
    output.success(&format!("{}: {} ({})", name, result.state(), strategy));

    match holder {
        Some(info) => output.progress(&format!(
            "  → Locked by {} (pid {}) since {}",
            info.holder, info.pid, info.started_at
        )),
        None => output.progress("  → Not locked"),
    }

    Ok(())
}
