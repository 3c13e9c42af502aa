use stowage_fsops::ArchiveOrchestrator;
use tracing::info;

use crate::cli::OutputFormat;
use crate::error::{CliError, CliResult};
use crate::output::render_records;

pub(crate) async fn handle_scan(
    orchestrator: &mut ArchiveOrchestrator,
    format: OutputFormat,
) -> CliResult<()> {
    let records = orchestrator
        .scan()
        .await
        .map_err(|err| CliError::fsops(&err))?;
    info!(count = records.len(), "scan finished");
    render_records(records, format)
}
