//! Test fixtures for building directory trees with controlled timestamps.

use std::fs::{self, File, FileTimes};
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime};

use tempfile::TempDir;

/// Seconds in one day.
pub const DAY: u64 = 86_400;

/// Write `contents` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns an error if a parent directory or the file cannot be written.
pub fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

/// Write `contents` to `path` and back-date its modify and access times by `age`.
///
/// # Errors
///
/// Returns an error if the file cannot be written or its times cannot be set.
pub fn write_aged_file(path: &Path, contents: &[u8], age: Duration) -> io::Result<()> {
    write_file(path, contents)?;
    let instant = back_dated(age)?;
    set_times(path, FileTimes::new().set_modified(instant).set_accessed(instant))
}

/// Write `contents` to `path` and back-date only its access time by `age`.
///
/// The modify time stays at the moment of writing.
///
/// # Errors
///
/// Returns an error if the file cannot be written or its times cannot be set.
pub fn write_accessed_file(path: &Path, contents: &[u8], age: Duration) -> io::Result<()> {
    write_file(path, contents)?;
    let instant = back_dated(age)?;
    set_times(path, FileTimes::new().set_accessed(instant))
}

fn back_dated(age: Duration) -> io::Result<SystemTime> {
    SystemTime::now()
        .checked_sub(age)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "age precedes the epoch"))
}

fn set_times(path: &Path, times: FileTimes) -> io::Result<()> {
    File::options().write(true).open(path)?.set_times(times)
}

/// Temporary directory with a recognisable prefix.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn temp_tree() -> anyhow::Result<TempDir> {
    Ok(tempfile::Builder::new().prefix("stowage-").tempdir()?)
}
