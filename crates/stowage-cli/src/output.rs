//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use serde::Serialize;
use stowage_fsops::{DeletionOutcome, FileRecord, RunReport};

use crate::cli::OutputFormat;
use crate::error::{CliError, CliResult};

pub(crate) fn render_records(records: &[FileRecord], format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(records)?,
        OutputFormat::Table => {
            println!("{:<32} PATH", "NAME");
            for record in records {
                println!("{:<32} {}", record.name, record.path.display());
            }
            println!("matched: {}", records.len());
        }
    }
    Ok(())
}

pub(crate) fn render_report(report: &RunReport, format: OutputFormat) -> CliResult<()> {
    match format {
        OutputFormat::Json => print_json(report)?,
        OutputFormat::Table => {
            println!("scanned: {}", report.scanned);
            println!("archive: {}", report.archive.path.display());
            println!(
                "members: {} ({})",
                report.archive.members,
                format_bytes(report.archive.bytes)
            );
            println!("verified: {}", report.verified);
            println!("deletion: {}", deletion_label(&report.deletion));
            if let DeletionOutcome::Completed(deletion) = &report.deletion {
                println!("removed: {}", deletion.removed.len());
                for failure in &deletion.failures {
                    println!("  failed: {} ({})", failure.path.display(), failure.error);
                }
            }
        }
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))?;
    println!("{text}");
    Ok(())
}

#[must_use]
pub(crate) const fn deletion_label(outcome: &DeletionOutcome) -> &'static str {
    match outcome {
        DeletionOutcome::Disabled => "disabled",
        DeletionOutcome::Blocked => "blocked",
        DeletionOutcome::Completed(_) => "completed",
    }
}

#[must_use]
pub(crate) fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;
    let value = bytes_to_f64(bytes);
    if value >= GIB {
        format!("{:.2} GiB", value / GIB)
    } else if value >= MIB {
        format!("{:.2} MiB", value / MIB)
    } else if value >= KIB {
        format!("{:.2} KiB", value / KIB)
    } else {
        format!("{bytes} B")
    }
}

fn bytes_to_f64(value: u64) -> f64 {
    let high = u32::try_from(value >> 32).unwrap_or(u32::MAX);
    let low = u32::try_from(value & 0xFFFF_FFFF).unwrap_or(u32::MAX);
    f64::from(high) * 4_294_967_296.0 + f64::from(low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use stowage_fsops::{ArchiveResult, DeletionFailure, DeletionReport};

    fn report(deletion: DeletionOutcome) -> RunReport {
        RunReport {
            scanned: 2,
            archive: ArchiveResult {
                path: PathBuf::from("/tmp/archives/run.zip"),
                bytes: 2048,
                members: 2,
                scan_generation: 1,
            },
            verified: true,
            deletion,
        }
    }

    #[test]
    fn format_bytes_picks_binary_units() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KiB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.00 MiB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.00 GiB");
    }

    #[test]
    fn deletion_labels_cover_every_outcome() {
        assert_eq!(deletion_label(&DeletionOutcome::Disabled), "disabled");
        assert_eq!(deletion_label(&DeletionOutcome::Blocked), "blocked");
        assert_eq!(
            deletion_label(&DeletionOutcome::Completed(DeletionReport::default())),
            "completed"
        );
    }

    #[test]
    fn report_json_tags_deletion_status() {
        let value = serde_json::to_value(report(DeletionOutcome::Completed(DeletionReport {
            removed: vec![PathBuf::from("/tmp/a.log")],
            failures: vec![DeletionFailure {
                path: PathBuf::from("/tmp/b.log"),
                error: "denied".to_string(),
            }],
        })))
        .unwrap_or_default();
        assert_eq!(value["deletion"]["status"], "completed");
        assert_eq!(value["deletion"]["failures"][0]["error"], "denied");
        assert_eq!(value["archive"]["members"], 2);
        assert_eq!(value["verified"], true);
    }

    #[test]
    fn renderers_accept_both_formats() {
        for format in [OutputFormat::Table, OutputFormat::Json] {
            assert!(render_report(&report(DeletionOutcome::Disabled), format).is_ok());
            assert!(render_records(&[], format).is_ok());
        }
    }
}
