use stowage_fsops::{ArchiveOrchestrator, RunReport};

use crate::cli::OutputFormat;
use crate::error::{CliError, CliResult};
use crate::output::render_report;

pub(crate) async fn handle_archive(
    orchestrator: &mut ArchiveOrchestrator,
    format: OutputFormat,
) -> CliResult<()> {
    let report = run_pipeline(orchestrator, format).await?;
    let failed = report.deletion.failures().len();
    if failed > 0 {
        return Err(CliError::PartialDeletion(failed));
    }
    Ok(())
}

pub(crate) async fn handle_check(
    orchestrator: &mut ArchiveOrchestrator,
    format: OutputFormat,
) -> CliResult<()> {
    run_pipeline(orchestrator, format).await.map(|_| ())
}

async fn run_pipeline(
    orchestrator: &mut ArchiveOrchestrator,
    format: OutputFormat,
) -> CliResult<RunReport> {
    let report = orchestrator
        .run()
        .await
        .map_err(|err| CliError::fsops(&err))?;
    render_report(&report, format)?;
    if !report.verified {
        return Err(CliError::Unverified(format!(
            "archive {} did not verify against the scan",
            report.archive.path.display()
        )));
    }
    Ok(report)
}
