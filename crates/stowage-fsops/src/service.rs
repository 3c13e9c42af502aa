//! Archive pipeline orchestrator: scan, build, verify, and retention.
//!
//! # Design
//! - Every mutating stage takes `&mut self`, so one orchestrator never runs two stages at once.
//! - Each scan bumps a generation; archives remember the generation they were built from and
//!   verification or deletion against a different generation is refused.
//! - Stages log start and outcome and increment `stowage_steps_total{step,status}`.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Local;
use stowage_config::{ArchiveConfig, ConfigOverrides};
use stowage_telemetry::Metrics;
use tracing::{debug, info, warn};

use crate::access::{FsAccess, LocalFs};
use crate::archive::{self, ArchiveMember};
use crate::error::{FsOpsError, FsOpsResult};
use crate::model::{ArchiveResult, DeletionOutcome, FileRecord, RunReport};
use crate::retention;
use crate::scan::{ScanFilter, Scanner};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StepKind {
    Scan,
    Build,
    Verify,
    Delete,
}

impl StepKind {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::Build => "build",
            Self::Verify => "verify",
            Self::Delete => "delete",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StepStatus {
    Started,
    Completed,
    Failed,
    Skipped,
}

impl StepStatus {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

#[derive(Debug)]
struct ScanState {
    generation: u64,
    records: Vec<FileRecord>,
}

/// Runs the scan, archive, verify, and delete stages over one configuration.
pub struct ArchiveOrchestrator {
    config: ArchiveConfig,
    access: Arc<dyn FsAccess>,
    metrics: Metrics,
    scan: Option<ScanState>,
    archive: Option<ArchiveResult>,
    generation: u64,
}

impl ArchiveOrchestrator {
    /// Orchestrator over the local filesystem.
    #[must_use]
    pub fn new(config: ArchiveConfig, metrics: Metrics) -> Self {
        Self::with_access(config, Arc::new(LocalFs), metrics)
    }

    /// Orchestrator over a caller-supplied filesystem accessor.
    #[must_use]
    pub fn with_access(config: ArchiveConfig, access: Arc<dyn FsAccess>, metrics: Metrics) -> Self {
        Self {
            config,
            access,
            metrics,
            scan: None,
            archive: None,
            generation: 0,
        }
    }

    /// Resolve `overrides` against the defaults and build a local orchestrator.
    ///
    /// # Errors
    ///
    /// Returns [`FsOpsError::Config`] when the overrides fail validation.
    pub fn from_overrides(overrides: ConfigOverrides, metrics: Metrics) -> FsOpsResult<Self> {
        let config = ArchiveConfig::resolve(overrides)
            .map_err(|source| FsOpsError::config("orchestrator.resolve", source))?;
        Ok(Self::new(config, metrics))
    }

    /// Configuration this orchestrator runs with.
    #[must_use]
    pub const fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    /// Records from the most recent scan; empty before the first scan.
    #[must_use]
    pub fn files(&self) -> &[FileRecord] {
        self.scan
            .as_ref()
            .map(|state| state.records.as_slice())
            .unwrap_or_default()
    }

    /// Archive from the most recent successful build.
    #[must_use]
    pub const fn last_archive(&self) -> Option<&ArchiveResult> {
        self.archive.as_ref()
    }

    /// Scan the configured root and replace the current records.
    ///
    /// # Errors
    ///
    /// Returns an error when any directory under the root cannot be listed or any entry cannot
    /// be stat'ed. The previous records are kept in that case.
    pub async fn scan(&mut self) -> FsOpsResult<&[FileRecord]> {
        self.record_step(StepKind::Scan, StepStatus::Started);
        let scanner = Scanner::new(
            Arc::clone(&self.access),
            ScanFilter::from_config(&self.config),
        );
        let records = self.finish_step(StepKind::Scan, scanner.scan(&self.config.root).await)?;

        self.generation += 1;
        self.metrics
            .add_files_scanned(u64::try_from(records.len()).unwrap_or(u64::MAX));
        info!(
            root = %self.config.root.display(),
            count = records.len(),
            generation = self.generation,
            "scan completed"
        );
        let state = self.scan.insert(ScanState {
            generation: self.generation,
            records,
        });
        Ok(&state.records)
    }

    /// Write the current records into a new archive.
    ///
    /// Building before any scan, or after a scan that matched nothing, writes an empty archive.
    ///
    /// # Errors
    ///
    /// Returns an error when the output directory cannot be created or the archive cannot be
    /// written. No archive is recorded in that case and nothing is deleted.
    pub async fn build_archive(&mut self) -> FsOpsResult<ArchiveResult> {
        self.archive = None;
        self.record_step(StepKind::Build, StepStatus::Started);
        let built = self.write_current().await;
        let result = self.finish_step(StepKind::Build, built)?;

        self.metrics.add_archive_bytes(result.bytes);
        info!(
            path = %result.path.display(),
            bytes = result.bytes,
            members = result.members,
            "archive written"
        );
        self.archive = Some(result.clone());
        Ok(result)
    }

    /// Whether the last archive holds exactly as many members as the current scan has records.
    ///
    /// False when nothing was scanned or built, when the archive came from an earlier
    /// scan, or when the archive cannot be read.
    pub async fn check_archive(&self) -> bool {
        self.record_step(StepKind::Verify, StepStatus::Started);
        let Some((built, records)) = self.current_pair() else {
            self.record_step(StepKind::Verify, StepStatus::Skipped);
            return false;
        };

        let path = built.path.clone();
        let format = self.config.format;
        let counted = tokio::task::spawn_blocking(move || archive::count_members(&path, format))
            .await
            .map_err(|source| FsOpsError::join("verify.count_members", source))
            .and_then(|counted| counted);

        match counted {
            Ok(members) if members == records.len() => {
                debug!(path = %built.path.display(), members, "archive verified");
                self.record_step(StepKind::Verify, StepStatus::Completed);
                true
            }
            Ok(members) => {
                warn!(
                    path = %built.path.display(),
                    members,
                    expected = records.len(),
                    "archive member count does not match scan"
                );
                self.record_step(StepKind::Verify, StepStatus::Failed);
                false
            }
            Err(err) => {
                warn!(
                    error = %err,
                    error_chain = %err.chain_message(),
                    path = %built.path.display(),
                    "archive could not be read for verification"
                );
                self.record_step(StepKind::Verify, StepStatus::Failed);
                false
            }
        }
    }

    /// Verify the last archive and, if deletion is enabled and it verified, remove the originals.
    pub async fn delete_files(&self) -> DeletionOutcome {
        if !self.config.delete_after_archive {
            return self.enforce_retention(false).await;
        }
        let verified = self.check_archive().await;
        self.enforce_retention(verified).await
    }

    /// Build, verify, and conditionally delete using the current scan.
    ///
    /// # Errors
    ///
    /// Returns an error only when the build fails; verification and deletion
    /// outcomes are reported in the [`RunReport`].
    pub async fn archive(&mut self) -> FsOpsResult<RunReport> {
        let archive = self.build_archive().await?;
        let verified = self.check_archive().await;
        let deletion = self.enforce_retention(verified).await;
        Ok(RunReport {
            scanned: self.files().len(),
            archive,
            verified,
            deletion,
        })
    }

    /// Scan and then [`archive`](Self::archive).
    ///
    /// # Errors
    ///
    /// Returns an error when the scan or the build fails.
    pub async fn run(&mut self) -> FsOpsResult<RunReport> {
        self.scan().await?;
        self.archive().await
    }

    async fn write_current(&self) -> FsOpsResult<ArchiveResult> {
        let output_dir = &self.config.output_dir;
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|source| FsOpsError::io("build.create_output_dir", output_dir, source))?;

        let target = output_dir.join(self.archive_file_name());
        let members = self
            .files()
            .iter()
            .map(|record| ArchiveMember::relative_to(&self.config.root, record.path()))
            .collect::<FsOpsResult<Vec<_>>>()?;
        let member_count = members.len();
        let scan_generation = self.scan.as_ref().map_or(0, |state| state.generation);

        let format = self.config.format;
        let options = self.config.writer;
        let path = target.clone();
        let bytes = tokio::task::spawn_blocking(move || {
            archive::write_archive(&path, format, options, &members)
        })
        .await
        .map_err(|source| FsOpsError::join("build.write_archive", source))??;

        Ok(ArchiveResult {
            path: target,
            bytes,
            members: member_count,
            scan_generation,
        })
    }

    fn archive_file_name(&self) -> String {
        self.config.output_name.clone().unwrap_or_else(|| {
            archive::derived_file_name(self.config.format, &Local::now())
        })
    }

    /// Archive and records only when both exist and belong to the same scan.
    fn current_pair(&self) -> Option<(&ArchiveResult, &[FileRecord])> {
        let Some(archive) = self.archive.as_ref() else {
            debug!("no archive has been built");
            return None;
        };
        let Some(scan) = self.scan.as_ref() else {
            debug!("no scan has been performed");
            return None;
        };
        if archive.scan_generation != scan.generation {
            warn!(
                archive_generation = archive.scan_generation,
                scan_generation = scan.generation,
                path = %archive.path.display(),
                "archive was built from a different scan"
            );
            return None;
        }
        Some((archive, scan.records.as_slice()))
    }

    async fn enforce_retention(&self, verified: bool) -> DeletionOutcome {
        if !self.config.delete_after_archive {
            self.record_step(StepKind::Delete, StepStatus::Skipped);
            return DeletionOutcome::Disabled;
        }
        let records = match self.current_pair() {
            Some((_, records)) if verified => records,
            _ => {
                warn!("archive not verified; originals kept");
                self.record_step(StepKind::Delete, StepStatus::Skipped);
                return DeletionOutcome::Blocked;
            }
        };

        self.record_step(StepKind::Delete, StepStatus::Started);
        let report = retention::remove_all(Arc::clone(&self.access), records).await;
        self.metrics
            .add_files_deleted(u64::try_from(report.removed.len()).unwrap_or(u64::MAX));
        self.metrics
            .add_deletion_failures(u64::try_from(report.failures.len()).unwrap_or(u64::MAX));

        if report.is_clean() {
            info!(removed = report.removed.len(), "archived originals removed");
            self.record_step(StepKind::Delete, StepStatus::Completed);
        } else {
            let failed = report
                .failures
                .iter()
                .map(|failure| failure.path.clone())
                .collect::<Vec<PathBuf>>();
            warn!(
                removed = report.removed.len(),
                failed = failed.len(),
                paths = ?failed,
                "some archived originals could not be removed"
            );
            self.record_step(StepKind::Delete, StepStatus::Failed);
        }
        DeletionOutcome::Completed(report)
    }

    fn finish_step<T>(&self, step: StepKind, result: FsOpsResult<T>) -> FsOpsResult<T> {
        match &result {
            Ok(_) => self.record_step(step, StepStatus::Completed),
            Err(err) => {
                warn!(
                    error = %err,
                    error_chain = %err.chain_message(),
                    step = step.as_str(),
                    "archive pipeline step failed"
                );
                self.record_step(step, StepStatus::Failed);
            }
        }
        result
    }

    fn record_step(&self, step: StepKind, status: StepStatus) {
        debug!(step = step.as_str(), status = status.as_str(), "pipeline step");
        self.metrics.inc_step(step.as_str(), status.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use std::fs;
    use std::io;
    use std::path::Path;
    use std::time::Duration;
    use stowage_config::ArchiveFormat;
    use stowage_test_support::fixtures::{DAY, write_aged_file, write_file};

    use crate::access::EntryStat;

    const OLD: Duration = Duration::from_secs(90 * DAY);

    fn overrides(root: &Path) -> ConfigOverrides {
        ConfigOverrides {
            root: Some(root.to_path_buf()),
            output_dir: Some(root.join("archives")),
            output_name: Some("run.zip".to_string()),
            ..ConfigOverrides::default()
        }
    }

    fn orchestrator(overrides: ConfigOverrides) -> Result<(ArchiveOrchestrator, Metrics)> {
        let metrics = Metrics::new()?;
        let orchestrator = ArchiveOrchestrator::from_overrides(overrides, metrics.clone())?;
        Ok((orchestrator, metrics))
    }

    fn seed_old(root: &Path, names: &[&str]) -> Result<()> {
        for name in names {
            write_aged_file(&root.join(name), name.as_bytes(), OLD)?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn scenario_flat_directory_archives_every_old_file() -> Result<()> {
        let temp = tempfile::tempdir()?;
        seed_old(temp.path(), &["1.log", "2.log", "3.log", "4.log", "5.log"])?;
        let (mut orchestrator, metrics) = orchestrator(ConfigOverrides {
            recursive: Some(false),
            ..overrides(temp.path())
        })?;

        let report = orchestrator.run().await?;
        assert_eq!(report.scanned, 5);
        assert_eq!(report.archive.members, 5);
        assert!(report.verified);
        assert_eq!(report.deletion, DeletionOutcome::Disabled);
        assert!(temp.path().join("archives/run.zip").exists());
        assert!(temp.path().join("1.log").exists());

        assert_eq!(metrics.step_count("scan", "completed"), 1);
        assert_eq!(metrics.step_count("verify", "completed"), 1);
        assert_eq!(metrics.step_count("delete", "skipped"), 1);
        assert_eq!(metrics.snapshot().files_scanned_total, 5);
        Ok(())
    }

    #[tokio::test]
    async fn scenario_recursion_toggle_changes_member_count() -> Result<()> {
        let temp = tempfile::tempdir()?;
        seed_old(
            temp.path(),
            &[
                "a.log", "b.log", "c.log", "x/1.log", "x/2.log", "y/1.log", "y/2.log",
            ],
        )?;

        let (mut recursive, _) = orchestrator(overrides(temp.path()))?;
        let report = recursive.run().await?;
        assert_eq!(report.scanned, 7);
        assert_eq!(report.archive.members, 7);
        assert!(report.verified);

        let (mut flat, _) = orchestrator(ConfigOverrides {
            recursive: Some(false),
            output_name: Some("flat.zip".to_string()),
            ..overrides(temp.path())
        })?;
        let report = flat.run().await?;
        assert_eq!(report.scanned, 3);
        assert!(report.verified);
        Ok(())
    }

    #[tokio::test]
    async fn scenario_empty_directory_builds_empty_verified_archive() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let (mut orchestrator, _) = orchestrator(overrides(temp.path()))?;

        assert!(orchestrator.scan().await?.is_empty());
        let archive = orchestrator.build_archive().await?;
        assert_eq!(archive.members, 0);
        assert_eq!(archive.scan_generation, 1);
        assert!(orchestrator.check_archive().await);
        Ok(())
    }

    #[tokio::test]
    async fn build_without_scan_is_never_verified() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let (mut orchestrator, _) = orchestrator(overrides(temp.path()))?;

        let archive = orchestrator.build_archive().await?;
        assert_eq!(archive.members, 0);
        assert_eq!(archive.scan_generation, 0);
        assert!(!orchestrator.check_archive().await);
        Ok(())
    }

    #[tokio::test]
    async fn check_is_false_before_anything_is_built() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let (mut orchestrator, metrics) = orchestrator(overrides(temp.path()))?;
        assert!(!orchestrator.check_archive().await);
        orchestrator.scan().await?;
        assert!(!orchestrator.check_archive().await);
        assert_eq!(metrics.step_count("verify", "skipped"), 2);
        Ok(())
    }

    #[tokio::test]
    async fn rescanning_after_build_invalidates_the_archive() -> Result<()> {
        let temp = tempfile::tempdir()?;
        seed_old(temp.path(), &["a.log", "b.log"])?;
        let (mut orchestrator, _) = orchestrator(overrides(temp.path()))?;

        orchestrator.scan().await?;
        orchestrator.build_archive().await?;
        assert!(orchestrator.check_archive().await);

        seed_old(temp.path(), &["c.log"])?;
        assert_eq!(orchestrator.scan().await?.len(), 3);
        assert!(!orchestrator.check_archive().await);
        Ok(())
    }

    #[tokio::test]
    async fn disabled_deletion_leaves_originals() -> Result<()> {
        let temp = tempfile::tempdir()?;
        seed_old(temp.path(), &["a.log"])?;
        let (mut orchestrator, _) = orchestrator(overrides(temp.path()))?;

        orchestrator.scan().await?;
        orchestrator.build_archive().await?;
        assert_eq!(orchestrator.delete_files().await, DeletionOutcome::Disabled);
        assert!(temp.path().join("a.log").exists());
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_archive_blocks_deletion() -> Result<()> {
        let temp = tempfile::tempdir()?;
        seed_old(temp.path(), &["a.log", "b.log"])?;
        let (mut orchestrator, metrics) = orchestrator(ConfigOverrides {
            delete_after_archive: Some(true),
            ..overrides(temp.path())
        })?;

        orchestrator.scan().await?;
        let archive = orchestrator.build_archive().await?;
        fs::write(&archive.path, b"garbage")?;

        assert_eq!(orchestrator.delete_files().await, DeletionOutcome::Blocked);
        assert!(temp.path().join("a.log").exists());
        assert!(temp.path().join("b.log").exists());
        assert_eq!(metrics.step_count("verify", "failed"), 1);
        Ok(())
    }

    #[tokio::test]
    async fn verified_run_deletes_originals() -> Result<()> {
        let temp = tempfile::tempdir()?;
        seed_old(temp.path(), &["a.log", "nested/b.log"])?;
        write_file(&temp.path().join("fresh.log"), b"fresh")?;
        let (mut orchestrator, metrics) = orchestrator(ConfigOverrides {
            delete_after_archive: Some(true),
            format: Some(ArchiveFormat::TarGz),
            output_name: Some("run.tar.gz".to_string()),
            ..overrides(temp.path())
        })?;

        let report = orchestrator.run().await?;
        assert!(report.verified);
        assert_eq!(report.deletion.removed_count(), 2);
        assert!(report.deletion.failures().is_empty());
        assert!(!temp.path().join("a.log").exists());
        assert!(!temp.path().join("nested/b.log").exists());
        assert!(temp.path().join("fresh.log").exists());
        assert!(report.archive.path.exists());
        assert_eq!(metrics.snapshot().files_deleted_total, 2);
        Ok(())
    }

    #[tokio::test]
    async fn previous_archives_are_not_rearchived() -> Result<()> {
        let temp = tempfile::tempdir()?;
        seed_old(temp.path(), &["a.log"])?;
        seed_old(temp.path(), &["archives/older.zip"])?;
        let (mut orchestrator, _) = orchestrator(overrides(temp.path()))?;

        let records = orchestrator.scan().await?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "a.log");
        Ok(())
    }

    #[tokio::test]
    async fn previous_archives_in_the_root_itself_are_not_rearchived() -> Result<()> {
        let temp = tempfile::tempdir()?;
        seed_old(
            temp.path(),
            &["a.log", "2020-01-01-00-00-00-archive.zip", "stale.zip.partial"],
        )?;
        let (mut orchestrator, _) = orchestrator(ConfigOverrides {
            output_dir: Some(temp.path().to_path_buf()),
            output_name: None,
            delete_after_archive: Some(true),
            ..overrides(temp.path())
        })?;

        let report = orchestrator.run().await?;
        assert_eq!(report.scanned, 1);
        assert_eq!(report.archive.members, 1);
        assert!(report.verified);
        let DeletionOutcome::Completed(deletion) = report.deletion else {
            anyhow::bail!("expected a completed retention pass");
        };
        assert_eq!(deletion.removed, vec![temp.path().join("a.log")]);
        assert!(temp.path().join("2020-01-01-00-00-00-archive.zip").exists());
        assert!(temp.path().join("stale.zip.partial").exists());
        assert!(report.archive.path.exists());
        Ok(())
    }

    struct DenyListing {
        denied: PathBuf,
    }

    #[async_trait]
    impl FsAccess for DenyListing {
        async fn list_dir(&self, dir: &Path) -> FsOpsResult<Vec<PathBuf>> {
            if dir == self.denied {
                return Err(FsOpsError::io(
                    "list_dir.open",
                    dir,
                    io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
                ));
            }
            LocalFs.list_dir(dir).await
        }

        async fn stat(&self, path: &Path) -> FsOpsResult<EntryStat> {
            LocalFs.stat(path).await
        }

        async fn remove_file(&self, path: &Path) -> FsOpsResult<()> {
            LocalFs.remove_file(path).await
        }
    }

    #[tokio::test]
    async fn unlistable_subdirectory_aborts_the_run_before_deletion() -> Result<()> {
        let temp = tempfile::tempdir()?;
        seed_old(temp.path(), &["a.log", "locked/b.log"])?;
        let config = ArchiveConfig::resolve(ConfigOverrides {
            delete_after_archive: Some(true),
            ..overrides(temp.path())
        })?;
        let metrics = Metrics::new()?;
        let mut orchestrator = ArchiveOrchestrator::with_access(
            config,
            Arc::new(DenyListing {
                denied: temp.path().join("locked"),
            }),
            metrics.clone(),
        );

        let result = orchestrator.run().await;
        assert!(matches!(
            result,
            Err(FsOpsError::Io {
                operation: "list_dir.open",
                ..
            })
        ));
        assert!(orchestrator.files().is_empty());
        assert!(orchestrator.last_archive().is_none());
        assert!(temp.path().join("a.log").exists());
        assert!(temp.path().join("locked/b.log").exists());
        assert!(!temp.path().join("archives/run.zip").exists());
        assert_eq!(metrics.step_count("scan", "failed"), 1);
        Ok(())
    }

    struct DenyRemoval {
        denied: PathBuf,
    }

    #[async_trait]
    impl FsAccess for DenyRemoval {
        async fn list_dir(&self, dir: &Path) -> FsOpsResult<Vec<PathBuf>> {
            LocalFs.list_dir(dir).await
        }

        async fn stat(&self, path: &Path) -> FsOpsResult<EntryStat> {
            LocalFs.stat(path).await
        }

        async fn remove_file(&self, path: &Path) -> FsOpsResult<()> {
            if path == self.denied {
                return Err(FsOpsError::io(
                    "remove_file",
                    path,
                    io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
                ));
            }
            LocalFs.remove_file(path).await
        }
    }

    #[tokio::test]
    async fn scenario_failed_removal_is_reported_and_others_removed() -> Result<()> {
        let temp = tempfile::tempdir()?;
        seed_old(temp.path(), &["a.log", "b.log", "c.log"])?;
        let denied = temp.path().join("b.log");
        let config = ArchiveConfig::resolve(ConfigOverrides {
            delete_after_archive: Some(true),
            ..overrides(temp.path())
        })?;
        let metrics = Metrics::new()?;
        let mut orchestrator = ArchiveOrchestrator::with_access(
            config,
            Arc::new(DenyRemoval {
                denied: denied.clone(),
            }),
            metrics.clone(),
        );

        let report = orchestrator.run().await?;
        assert!(report.verified);
        let DeletionOutcome::Completed(deletion) = report.deletion else {
            anyhow::bail!("expected a completed retention pass");
        };
        assert_eq!(deletion.removed.len(), 2);
        assert_eq!(deletion.failures.len(), 1);
        assert_eq!(deletion.failures[0].path, denied);
        assert!(deletion.failures[0].error.contains("denied"));
        assert!(denied.exists());
        assert!(!temp.path().join("a.log").exists());
        assert!(!temp.path().join("c.log").exists());
        assert_eq!(metrics.snapshot().deletion_failures_total, 1);
        assert_eq!(metrics.step_count("delete", "failed"), 1);
        Ok(())
    }

    #[tokio::test]
    async fn failed_build_records_no_archive() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let blocker = temp.path().join("archives");
        fs::write(&blocker, b"not a directory")?;
        let (mut orchestrator, metrics) = orchestrator(overrides(temp.path()))?;

        let result = orchestrator.build_archive().await;
        assert!(matches!(
            result,
            Err(FsOpsError::Io {
                operation: "build.create_output_dir",
                ..
            })
        ));
        assert!(orchestrator.last_archive().is_none());
        assert_eq!(metrics.step_count("build", "failed"), 1);
        Ok(())
    }

    #[test]
    fn conflicting_overrides_surface_as_config_errors() -> Result<()> {
        let result = ArchiveOrchestrator::from_overrides(
            ConfigOverrides {
                cutoff: Some(chrono::Utc::now()),
                older_than_days: Some(3),
                ..ConfigOverrides::default()
            },
            Metrics::new()?,
        );
        assert!(matches!(result, Err(FsOpsError::Config { .. })));
        Ok(())
    }
}
