//! Domain models produced by the archive pipeline.
//!
//! # Design
//! - Plain data carriers; none of them hold IO handles.
//! - Every stage outcome is a separate field so callers never infer one from another.

use std::path::{Path, PathBuf};

use serde::Serialize;

/// A file matched by the scanner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Base name of the entry.
    pub name: String,
    /// Absolute path of the entry.
    pub path: PathBuf,
}

impl FileRecord {
    /// Build a record for `path`, using its final component as the display name.
    #[must_use]
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path }
    }

    /// Absolute path of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Archive produced by one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveResult {
    /// Absolute path of the finished archive.
    pub path: PathBuf,
    /// Size of the archive on disk.
    pub bytes: u64,
    /// Members written into the archive.
    pub members: usize,
    /// Generation of the scan whose records were archived; zero when built without a scan.
    pub scan_generation: u64,
}

/// A removal that did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionFailure {
    /// File that could not be removed.
    pub path: PathBuf,
    /// Error chain describing the failure.
    pub error: String,
}

/// Aggregated per-file results of a retention pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    /// Files removed from disk.
    pub removed: Vec<PathBuf>,
    /// Files that are still present because removal failed.
    pub failures: Vec<DeletionFailure>,
}

impl DeletionReport {
    /// Whether every recorded file was removed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// What happened to the originals after the archive stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeletionOutcome {
    /// Deletion is not enabled in the configuration.
    Disabled,
    /// Deletion was enabled but the archive did not verify, so nothing was removed.
    Blocked,
    /// A retention pass ran.
    Completed(DeletionReport),
}

impl DeletionOutcome {
    /// Files removed, zero unless a retention pass ran.
    #[must_use]
    pub fn removed_count(&self) -> usize {
        match self {
            Self::Completed(report) => report.removed.len(),
            Self::Disabled | Self::Blocked => 0,
        }
    }

    /// Failures recorded by the retention pass.
    #[must_use]
    pub fn failures(&self) -> &[DeletionFailure] {
        match self {
            Self::Completed(report) => &report.failures,
            Self::Disabled | Self::Blocked => &[],
        }
    }
}

/// Observable outcome of a full run: scanned, archived, verified, deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    /// Files matched by the scan the archive was built from.
    pub scanned: usize,
    /// The archive written by this run.
    pub archive: ArchiveResult,
    /// Whether the archive's member count matched the scan.
    pub verified: bool,
    /// Retention outcome.
    pub deletion: DeletionOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_name_is_final_component() {
        let record = FileRecord::from_path(PathBuf::from("/var/log/app/old.log"));
        assert_eq!(record.name, "old.log");
        assert_eq!(record.path(), Path::new("/var/log/app/old.log"));
    }

    #[test]
    fn outcome_counts_only_completed_passes() {
        let report = DeletionReport {
            removed: vec![PathBuf::from("/a"), PathBuf::from("/b")],
            failures: vec![DeletionFailure {
                path: PathBuf::from("/c"),
                error: "denied".to_string(),
            }],
        };
        assert!(!report.is_clean());

        let outcome = DeletionOutcome::Completed(report);
        assert_eq!(outcome.removed_count(), 2);
        assert_eq!(outcome.failures().len(), 1);
        assert_eq!(DeletionOutcome::Blocked.removed_count(), 0);
        assert!(DeletionOutcome::Disabled.failures().is_empty());
    }
}
