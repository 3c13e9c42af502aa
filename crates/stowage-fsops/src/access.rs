//! Filesystem access seam used by the scanner and retention stages.
//!
//! # Design
//! - Listing, stat, and removal go through `FsAccess` so tests can inject failures.
//! - `LocalFs` never follows symlinks; links surface as `EntryKind::Other`.
//! - Timestamps the platform cannot report are `None` rather than an error.

use std::fs::Metadata;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use stowage_config::TimestampKind;

use crate::error::{FsOpsError, FsOpsResult};

/// Entry type as reported by the accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symlinks, sockets, devices, and anything else.
    Other,
}

/// Type and timestamps for one directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryStat {
    /// Entry type.
    pub kind: EntryKind,
    /// Creation time.
    pub birth: Option<DateTime<Utc>>,
    /// Inode change time.
    pub change: Option<DateTime<Utc>>,
    /// Content modification time.
    pub modify: Option<DateTime<Utc>>,
    /// Last access time.
    pub access: Option<DateTime<Utc>>,
}

impl EntryStat {
    /// Timestamp selected by `kind`.
    #[must_use]
    pub const fn timestamp(&self, kind: TimestampKind) -> Option<DateTime<Utc>> {
        match kind {
            TimestampKind::Birth => self.birth,
            TimestampKind::Change => self.change,
            TimestampKind::Modify => self.modify,
            TimestampKind::Access => self.access,
        }
    }

    /// Translate std metadata (obtained without following links).
    #[must_use]
    pub fn from_metadata(metadata: &Metadata) -> Self {
        let file_type = metadata.file_type();
        let kind = if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::Other
        };

        Self {
            kind,
            birth: metadata.created().ok().map(DateTime::<Utc>::from),
            change: change_time(metadata),
            modify: metadata.modified().ok().map(DateTime::<Utc>::from),
            access: metadata.accessed().ok().map(DateTime::<Utc>::from),
        }
    }
}

#[cfg(unix)]
fn change_time(metadata: &Metadata) -> Option<DateTime<Utc>> {
    use std::os::unix::fs::MetadataExt;

    let nanos = u32::try_from(metadata.ctime_nsec()).ok()?;
    DateTime::from_timestamp(metadata.ctime(), nanos)
}

#[cfg(not(unix))]
const fn change_time(_metadata: &Metadata) -> Option<DateTime<Utc>> {
    None
}

/// Black-box list/stat/remove capability.
#[async_trait]
pub trait FsAccess: Send + Sync {
    /// Paths of the entries directly inside `dir`.
    async fn list_dir(&self, dir: &Path) -> FsOpsResult<Vec<PathBuf>>;

    /// Type and timestamps of `path`, without following symlinks.
    async fn stat(&self, path: &Path) -> FsOpsResult<EntryStat>;

    /// Remove the file at `path`.
    async fn remove_file(&self, path: &Path) -> FsOpsResult<()>;
}

/// `FsAccess` backed by the local filesystem via `tokio::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

#[async_trait]
impl FsAccess for LocalFs {
    async fn list_dir(&self, dir: &Path) -> FsOpsResult<Vec<PathBuf>> {
        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(|source| FsOpsError::io("list_dir.open", dir, source))?;
        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|source| FsOpsError::io("list_dir.next_entry", dir, source))?
        {
            paths.push(entry.path());
        }
        paths.sort();
        Ok(paths)
    }

    async fn stat(&self, path: &Path) -> FsOpsResult<EntryStat> {
        let metadata = tokio::fs::symlink_metadata(path)
            .await
            .map_err(|source| FsOpsError::io("stat.symlink_metadata", path, source))?;
        Ok(EntryStat::from_metadata(&metadata))
    }

    async fn remove_file(&self, path: &Path) -> FsOpsResult<()> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|source| FsOpsError::io("remove_file", path, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::fs;

    #[tokio::test]
    async fn lists_sorted_entries_and_classifies_them() -> Result<()> {
        let temp = tempfile::tempdir()?;
        fs::write(temp.path().join("b.log"), "b")?;
        fs::write(temp.path().join("a.log"), "a")?;
        fs::create_dir(temp.path().join("nested"))?;

        let access = LocalFs;
        let entries = access.list_dir(temp.path()).await?;
        assert_eq!(
            entries,
            vec![
                temp.path().join("a.log"),
                temp.path().join("b.log"),
                temp.path().join("nested"),
            ]
        );

        let file = access.stat(&temp.path().join("a.log")).await?;
        assert_eq!(file.kind, EntryKind::File);
        assert!(file.modify.is_some());
        assert_eq!(file.timestamp(TimestampKind::Modify), file.modify);

        let dir = access.stat(&temp.path().join("nested")).await?;
        assert_eq!(dir.kind, EntryKind::Directory);
        Ok(())
    }

    #[test]
    fn timestamp_kind_maps_to_its_own_field() -> Result<()> {
        let at = |secs| {
            DateTime::<Utc>::from_timestamp(secs, 0)
                .ok_or_else(|| anyhow::anyhow!("fixed instant should be valid"))
        };
        let stat = EntryStat {
            kind: EntryKind::File,
            birth: Some(at(1_000)?),
            change: Some(at(2_000)?),
            modify: Some(at(3_000)?),
            access: Some(at(4_000)?),
        };

        assert_eq!(stat.timestamp(TimestampKind::Birth), Some(at(1_000)?));
        assert_eq!(stat.timestamp(TimestampKind::Change), Some(at(2_000)?));
        assert_eq!(stat.timestamp(TimestampKind::Modify), Some(at(3_000)?));
        assert_eq!(stat.timestamp(TimestampKind::Access), Some(at(4_000)?));

        let unreported = EntryStat {
            birth: None,
            change: None,
            ..stat
        };
        assert_eq!(unreported.timestamp(TimestampKind::Birth), None);
        assert_eq!(unreported.timestamp(TimestampKind::Change), None);
        Ok(())
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn symlinks_are_not_followed() -> Result<()> {
        let temp = tempfile::tempdir()?;
        fs::write(temp.path().join("target.log"), "t")?;
        std::os::unix::fs::symlink(temp.path().join("target.log"), temp.path().join("link"))?;

        let stat = LocalFs.stat(&temp.path().join("link")).await?;
        assert_eq!(stat.kind, EntryKind::Other);
        assert!(stat.change.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn missing_directory_reports_io_error() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let missing = temp.path().join("missing");
        let result = LocalFs.list_dir(&missing).await;
        assert!(matches!(
            result,
            Err(FsOpsError::Io {
                operation: "list_dir.open",
                ..
            })
        ));
        Ok(())
    }
}
