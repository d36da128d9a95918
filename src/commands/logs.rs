// ABOUTME: Logs command implementation.
// ABOUTME: Streams a project's deploy log to stdout.

use super::connection::{connect, disconnect, flush_warnings, orchestrator};
use skiff::config::Config;
use skiff::diagnostics::Diagnostics;
use skiff::error::Result;
use skiff::output::Output;
use skiff::project::ProjectName;
use tokio::io::AsyncWriteExt;

pub async fn logs(
    config: &Config,
    name: &ProjectName,
    lines: usize,
    follow: bool,
    output: Output,
) -> Result<()> {
    let mut diag = Diagnostics::default();

    let session = connect(config, &output).await?;
    let mut stdout = tokio::io::stdout();
    let result = orchestrator(config, &session)
        .tail_logs(name, lines, follow, &mut stdout)
        .await;
    let _ = stdout.flush().await;
    disconnect(session, &mut diag).await;
    flush_warnings(diag, &output);

    result?;
    Ok(())
}
