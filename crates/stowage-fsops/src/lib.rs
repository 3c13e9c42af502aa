#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Age-based archival of directory trees.
//!
//! Layout:
//! - `access.rs`: filesystem seam (`FsAccess`) and the local implementation
//! - `scan.rs`: concurrent, age-filtered directory walk
//! - `archive.rs`: zip and tar.gz writer/reader
//! - `retention.rs`: removal of archived originals
//! - `service.rs`: `ArchiveOrchestrator` composing the stages
//! - `model.rs` / `error.rs`: shared types

pub mod access;
pub mod archive;
pub mod error;
pub mod model;
pub mod retention;
pub mod scan;
pub mod service;

pub use access::{EntryKind, EntryStat, FsAccess, LocalFs};
pub use error::{FsOpsError, FsOpsResult};
pub use model::{
    ArchiveResult, DeletionFailure, DeletionOutcome, DeletionReport, FileRecord, RunReport,
};
pub use scan::{ScanFilter, Scanner};
pub use service::ArchiveOrchestrator;
