//! Removal of archived originals.
//!
//! # Design
//! - One task per file; a failure is recorded against its path and never aborts the pass.
//! - Callers decide whether removal may happen at all; this module only removes.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::access::FsAccess;
use crate::error::FsOpsError;
use crate::model::{DeletionFailure, DeletionReport, FileRecord};

/// Remove every recorded file concurrently and report per-file results.
pub async fn remove_all(access: Arc<dyn FsAccess>, records: &[FileRecord]) -> DeletionReport {
    let tasks = records
        .iter()
        .map(|record| {
            let access = Arc::clone(&access);
            let path = record.path.clone();
            let handle = tokio::spawn(async move { access.remove_file(&path).await });
            (record.path.clone(), handle)
        })
        .collect::<Vec<_>>();

    let mut report = DeletionReport::default();
    for (path, handle) in tasks {
        let outcome = handle
            .await
            .map_err(|source| FsOpsError::join("retention.remove", source))
            .and_then(|removed| removed);
        match outcome {
            Ok(()) => {
                debug!(path = %path.display(), "removed archived original");
                report.removed.push(path);
            }
            Err(err) => {
                warn!(
                    error = %err,
                    error_chain = %err.chain_message(),
                    path = %path.display(),
                    "failed to remove archived original"
                );
                report.failures.push(failure(path, &err));
            }
        }
    }
    report
}

fn failure(path: PathBuf, err: &FsOpsError) -> DeletionFailure {
    DeletionFailure {
        path,
        error: err.chain_message(),
    }
}
