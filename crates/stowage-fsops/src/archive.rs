//! Archive writer and reader for the supported container formats.
//!
//! # Design
//! - Blocking codec work; callers run these functions inside `spawn_blocking`.
//! - Archives are written to a `.partial` sibling and renamed only once finished and synced,
//!   so an interrupted build never leaves a file at the final path.
//! - Member names are relative to the scan root and always use `/` separators.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, TimeZone};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use stowage_config::defaults::ARCHIVE_NAME_SUFFIX;
use stowage_config::{ArchiveFormat, WriterOptions};
use tracing::warn;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::error::{FsOpsError, FsOpsResult};

/// Suffix of the in-progress file written next to the final archive path.
pub const PARTIAL_SUFFIX: &str = ".partial";

/// One input file and the name it is stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    /// File read from disk.
    pub source: PathBuf,
    /// Name inside the archive.
    pub name: String,
}

impl ArchiveMember {
    /// Build a member for `source`, naming it relative to `root`.
    ///
    /// # Errors
    ///
    /// Returns an error if `source` is not inside `root` or contains non-plain components.
    pub fn relative_to(root: &Path, source: &Path) -> FsOpsResult<Self> {
        Ok(Self {
            source: source.to_path_buf(),
            name: member_name(root, source)?,
        })
    }
}

/// Name `path` relative to `root`, joined with `/`.
///
/// # Errors
///
/// Returns an error if `path` is not below `root` or the relative path is not a plain file path.
pub fn member_name(root: &Path, path: &Path) -> FsOpsResult<String> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| FsOpsError::InvalidInput {
            field: "member_path",
            reason: "outside_root",
            value: Some(path.to_string_lossy().into_owned()),
        })?;

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => segments.push(segment.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => {
                return Err(FsOpsError::InvalidInput {
                    field: "member_path",
                    reason: "invalid_segment",
                    value: Some(path.to_string_lossy().into_owned()),
                });
            }
        }
    }

    if segments.is_empty() {
        return Err(FsOpsError::InvalidInput {
            field: "member_path",
            reason: "empty",
            value: Some(path.to_string_lossy().into_owned()),
        });
    }
    Ok(segments.join("/"))
}

/// Archive file name derived from a wall-clock instant.
#[must_use]
pub fn derived_file_name<Tz>(format: ArchiveFormat, at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}-{ARCHIVE_NAME_SUFFIX}.{}",
        at.format("%Y-%m-%d-%H-%M-%S"),
        format.extension()
    )
}

/// Whether `name` looks like a file this crate writes into the output directory.
///
/// Covers the explicit output name, derived `<timestamp>-archive.<ext>` names, and leftover
/// `.partial` files from interrupted builds.
#[must_use]
pub fn is_archive_artifact(name: &str, explicit: Option<&str>) -> bool {
    if explicit == Some(name) || name.ends_with(PARTIAL_SUFFIX) {
        return true;
    }
    [ArchiveFormat::Zip, ArchiveFormat::TarGz]
        .into_iter()
        .any(|format| name.ends_with(&format!("-{ARCHIVE_NAME_SUFFIX}.{}", format.extension())))
}

/// Write `members` into a new archive at `target` and return its size in bytes.
///
/// # Errors
///
/// Returns an error if any input cannot be read or the container cannot be
/// written, finished, synced, or moved into place. No file is left at `target`
/// or at the partial path when this fails.
pub fn write_archive(
    target: &Path,
    format: ArchiveFormat,
    options: WriterOptions,
    members: &[ArchiveMember],
) -> FsOpsResult<u64> {
    let partial = partial_path(target);
    let written = match format {
        ArchiveFormat::Zip => write_zip(&partial, options, members),
        ArchiveFormat::TarGz => write_tar_gz(&partial, options, members),
    }
    .and_then(|()| {
        fs::rename(&partial, target)
            .map_err(|source| FsOpsError::io("write_archive.rename", target, source))
    });

    if let Err(err) = written {
        discard_partial(&partial);
        return Err(err);
    }

    fs::metadata(target)
        .map(|metadata| metadata.len())
        .map_err(|source| FsOpsError::io("write_archive.metadata", target, source))
}

/// Count the members of the archive at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or does not parse as `format`.
pub fn count_members(path: &Path, format: ArchiveFormat) -> FsOpsResult<usize> {
    let file =
        File::open(path).map_err(|source| FsOpsError::io("count_members.open", path, source))?;
    match format {
        ArchiveFormat::Zip => {
            let archive = ZipArchive::new(file)
                .map_err(|source| FsOpsError::zip("count_members.decode", path, source))?;
            Ok(archive.len())
        }
        ArchiveFormat::TarGz => {
            let mut archive = tar::Archive::new(GzDecoder::new(file));
            let entries = archive
                .entries()
                .map_err(|source| FsOpsError::io("count_members.entries", path, source))?;
            let mut count = 0;
            for entry in entries {
                entry.map_err(|source| FsOpsError::io("count_members.read_entry", path, source))?;
                count += 1;
            }
            Ok(count)
        }
    }
}

fn write_zip(path: &Path, options: WriterOptions, members: &[ArchiveMember]) -> FsOpsResult<()> {
    let file =
        File::create(path).map_err(|source| FsOpsError::io("write_zip.create", path, source))?;
    let mut writer = ZipWriter::new(file);
    let level = i32::try_from(options.compression_level).map_err(|_| {
        FsOpsError::InvalidInput {
            field: "compression_level",
            reason: "out_of_range",
            value: Some(options.compression_level.to_string()),
        }
    })?;
    let base = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(level));

    for member in members {
        let mut input = File::open(&member.source)
            .map_err(|source| FsOpsError::io("write_zip.open_member", &member.source, source))?;
        let size = input
            .metadata()
            .map_err(|source| FsOpsError::io("write_zip.member_metadata", &member.source, source))?
            .len();
        writer
            .start_file(member.name.as_str(), base.large_file(size >= u64::from(u32::MAX)))
            .map_err(|source| FsOpsError::zip("write_zip.start_file", path, source))?;
        io::copy(&mut input, &mut writer)
            .map_err(|source| FsOpsError::io("write_zip.copy", &member.source, source))?;
    }

    let file = writer
        .finish()
        .map_err(|source| FsOpsError::zip("write_zip.finish", path, source))?;
    file.sync_all()
        .map_err(|source| FsOpsError::io("write_zip.sync", path, source))
}

fn write_tar_gz(
    path: &Path,
    options: WriterOptions,
    members: &[ArchiveMember],
) -> FsOpsResult<()> {
    let file =
        File::create(path).map_err(|source| FsOpsError::io("write_tar.create", path, source))?;
    let encoder = GzEncoder::new(file, Compression::new(options.compression_level));
    let mut builder = tar::Builder::new(encoder);

    for member in members {
        builder
            .append_path_with_name(&member.source, &member.name)
            .map_err(|source| FsOpsError::io("write_tar.append", &member.source, source))?;
    }

    let encoder = builder
        .into_inner()
        .map_err(|source| FsOpsError::io("write_tar.finish", path, source))?;
    let file = encoder
        .finish()
        .map_err(|source| FsOpsError::io("write_tar.compress", path, source))?;
    file.sync_all()
        .map_err(|source| FsOpsError::io("write_tar.sync", path, source))
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(target.as_os_str());
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

fn discard_partial(partial: &Path) {
    if let Err(err) = fs::remove_file(partial)
        && err.kind() != io::ErrorKind::NotFound
    {
        warn!(
            error = %err,
            path = %partial.display(),
            "failed to remove partial archive"
        );
    }
}
