//! Recursive, age-filtered directory scan.
//!
//! # Design
//! - One tokio task per directory entry; a directory's children are joined before it returns.
//! - Children are joined in listing order, so results are deterministic for an unchanged tree.
//! - Exclusion is an explicit filter over `Option<FileRecord>`; only regular files can match.
//! - Any directory that cannot be listed, or entry that cannot be stat'ed, fails the whole scan.
//! - The output directory is never descended into. When it is a scanned directory, the archives
//!   and `.partial` files written there are excluded.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use stowage_config::{ArchiveConfig, TimestampKind};
use tracing::debug;

use crate::access::{EntryKind, EntryStat, FsAccess};
use crate::archive::is_archive_artifact;
use crate::error::{FsOpsError, FsOpsResult};
use crate::model::FileRecord;

type ScanFuture = Pin<Box<dyn Future<Output = FsOpsResult<Vec<FileRecord>>> + Send>>;

/// Filter applied to every entry during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFilter {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Files strictly older than this instant match.
    pub cutoff: DateTime<Utc>,
    /// Timestamp compared against the cutoff.
    pub timestamp: TimestampKind,
    /// Directory never descended into (the archive output directory).
    pub skip_dir: Option<PathBuf>,
    /// Explicit archive name written into `skip_dir`.
    pub output_name: Option<String>,
}

impl ScanFilter {
    /// Derive the filter from a resolved configuration.
    #[must_use]
    pub fn from_config(config: &ArchiveConfig) -> Self {
        Self {
            recursive: config.recursive,
            cutoff: config.cutoff,
            timestamp: config.timestamp,
            skip_dir: Some(config.output_dir.clone()),
            output_name: config.output_name.clone(),
        }
    }

    /// Whether a regular file with these timestamps is old enough to archive.
    #[must_use]
    pub fn matches(&self, stat: &EntryStat) -> bool {
        stat.timestamp(self.timestamp)
            .filter(|timestamp| *timestamp < self.cutoff)
            .is_some()
    }

    fn descends_into(&self, dir: &Path) -> bool {
        self.recursive && self.skip_dir.as_deref() != Some(dir)
    }

    fn is_output_artifact(&self, path: &Path) -> bool {
        self.skip_dir.is_some()
            && path.parent() == self.skip_dir.as_deref()
            && path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| is_archive_artifact(name, self.output_name.as_deref()))
    }
}

/// Walks a root directory and collects the files matching a [`ScanFilter`].
#[derive(Clone)]
pub struct Scanner {
    access: Arc<dyn FsAccess>,
    filter: Arc<ScanFilter>,
}

impl Scanner {
    /// Construct a scanner over the given accessor.
    #[must_use]
    pub fn new(access: Arc<dyn FsAccess>, filter: ScanFilter) -> Self {
        Self {
            access,
            filter: Arc::new(filter),
        }
    }

    /// Scan `root` and return every matching file, flattened across subdirectories.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` or any directory below it cannot be listed, or if an
    /// entry cannot be stat'ed. No partial result is returned.
    pub async fn scan(&self, root: &Path) -> FsOpsResult<Vec<FileRecord>> {
        let records = scan_dir(
            Arc::clone(&self.access),
            Arc::clone(&self.filter),
            root.to_path_buf(),
        )
        .await?;
        debug!(root = %root.display(), count = records.len(), "scan finished");
        Ok(records)
    }
}

fn scan_dir(access: Arc<dyn FsAccess>, filter: Arc<ScanFilter>, dir: PathBuf) -> ScanFuture {
    Box::pin(async move {
        let entries = access.list_dir(&dir).await?;

        let tasks = entries
            .into_iter()
            .map(|path| {
                let access = Arc::clone(&access);
                let filter = Arc::clone(&filter);
                tokio::spawn(visit_entry(access, filter, path))
            })
            .collect::<Vec<_>>();

        let mut records = Vec::new();
        for task in tasks {
            let matched = task
                .await
                .map_err(|source| FsOpsError::join("scan.visit_entry", source))??;
            records.extend(matched);
        }
        Ok(records)
    })
}

async fn visit_entry(
    access: Arc<dyn FsAccess>,
    filter: Arc<ScanFilter>,
    path: PathBuf,
) -> FsOpsResult<Vec<FileRecord>> {
    let stat = access.stat(&path).await?;
    match stat.kind {
        EntryKind::Directory if filter.descends_into(&path) => {
            scan_dir(access, filter, path).await
        }
        EntryKind::Directory | EntryKind::Other => Ok(Vec::new()),
        EntryKind::File if filter.is_output_artifact(&path) => Ok(Vec::new()),
        EntryKind::File => Ok(Some(FileRecord::from_path(path))
            .filter(|_| filter.matches(&stat))
            .into_iter()
            .collect()),
    }
}
