//! Typed configuration models and override payloads.
//!
//! # Design
//! - `ArchiveConfig` is resolved once per run and never mutated afterwards.
//! - `ConfigOverrides` mirrors every field as optional so file and CLI layers merge cleanly.
//! - Relative paths are made absolute at resolution time; nothing re-reads the working directory later.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::defaults::{
    DEFAULT_AGE_DAYS, DEFAULT_COMPRESSION_LEVEL, DEFAULT_OUTPUT_DIR, DEFAULT_ROOT,
};
use crate::error::{ConfigError, ConfigResult};
use crate::validate;

/// File timestamp compared against the cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampKind {
    /// Creation time, where the platform records one.
    Birth,
    /// Inode change time.
    Change,
    /// Content modification time.
    #[default]
    Modify,
    /// Last access time.
    Access,
}

impl TimestampKind {
    #[must_use]
    /// Render the kind as its lowercase string representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Birth => "birth",
            Self::Change => "change",
            Self::Modify => "modify",
            Self::Access => "access",
        }
    }
}

impl FromStr for TimestampKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "birth" => Ok(Self::Birth),
            "change" => Ok(Self::Change),
            "modify" => Ok(Self::Modify),
            "access" => Ok(Self::Access),
            other => Err(ConfigError::invalid(
                "timestamp",
                "unknown_kind",
                Some(other.to_string()),
            )),
        }
    }
}

impl Display for TimestampKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Container format written by the archive stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ArchiveFormat {
    /// Deflate-compressed zip container.
    #[default]
    #[serde(rename = "zip")]
    Zip,
    /// Gzip-compressed tarball.
    #[serde(rename = "tar.gz", alias = "tgz")]
    TarGz,
}

impl ArchiveFormat {
    #[must_use]
    /// Identifier used in configuration documents and CLI flags.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Zip => "zip",
            Self::TarGz => "tar.gz",
        }
    }

    #[must_use]
    /// File extension (without the leading dot) for archives of this format.
    pub const fn extension(self) -> &'static str {
        self.as_str()
    }
}

impl FromStr for ArchiveFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "zip" => Ok(Self::Zip),
            "tar.gz" | "tgz" => Ok(Self::TarGz),
            other => Err(ConfigError::invalid(
                "format",
                "unknown_format",
                Some(other.to_string()),
            )),
        }
    }
}

impl Display for ArchiveFormat {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Format-specific knobs handed to the archive writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriterOptions {
    /// Compression level, 0 (store) through 9 (smallest).
    pub compression_level: u32,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

/// Fully resolved configuration for one archive run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveConfig {
    /// Absolute directory that is scanned.
    pub root: PathBuf,
    /// Whether subdirectories are descended into.
    pub recursive: bool,
    /// Files whose selected timestamp is strictly earlier than this are archived.
    pub cutoff: DateTime<Utc>,
    /// Timestamp compared against the cutoff.
    pub timestamp: TimestampKind,
    /// Absolute directory the archive is written into.
    pub output_dir: PathBuf,
    /// Explicit archive file name; derived from the wall clock when absent.
    pub output_name: Option<String>,
    /// Container format.
    pub format: ArchiveFormat,
    /// Writer options for the selected format.
    pub writer: WriterOptions,
    /// Remove originals after the archive has been verified.
    pub delete_after_archive: bool,
}

impl ArchiveConfig {
    /// Merge the overrides over the defaults using the current time for age-based cutoffs.
    ///
    /// # Errors
    ///
    /// Returns an error when an override fails validation or a path cannot be made absolute.
    pub fn resolve(overrides: ConfigOverrides) -> ConfigResult<Self> {
        Self::resolve_at(overrides, Utc::now())
    }

    /// Merge the overrides over the defaults, computing relative cutoffs from `now`.
    ///
    /// # Errors
    ///
    /// Returns an error when an override fails validation or a path cannot be made absolute.
    pub fn resolve_at(overrides: ConfigOverrides, now: DateTime<Utc>) -> ConfigResult<Self> {
        let ConfigOverrides {
            root,
            recursive,
            timestamp,
            cutoff,
            older_than_days,
            output_dir,
            output_name,
            format,
            compression_level,
            delete_after_archive,
        } = overrides;

        let root = root.unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));
        validate::validate_root(&root)?;

        let cutoff = match (cutoff, older_than_days) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::ConflictingFields {
                    first: "cutoff",
                    second: "older_than_days",
                });
            }
            (Some(cutoff), None) => cutoff,
            (None, days) => {
                let days = days.unwrap_or(DEFAULT_AGE_DAYS);
                validate::validate_age_days(days)?;
                now.checked_sub_signed(TimeDelta::days(i64::from(days)))
                    .ok_or_else(|| {
                        ConfigError::invalid(
                            "older_than_days",
                            "out_of_range",
                            Some(days.to_string()),
                        )
                    })?
            }
        };

        let compression_level = compression_level.unwrap_or(DEFAULT_COMPRESSION_LEVEL);
        validate::validate_compression_level(compression_level)?;

        if let Some(name) = output_name.as_deref() {
            validate::validate_output_name(name)?;
        }

        let output_dir = output_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        Ok(Self {
            root: absolute(&root, "resolve.root")?,
            recursive: recursive.unwrap_or(true),
            cutoff,
            timestamp: timestamp.unwrap_or_default(),
            output_dir: absolute(&output_dir, "resolve.output_dir")?,
            output_name,
            format: format.unwrap_or_default(),
            writer: WriterOptions { compression_level },
            delete_after_archive: delete_after_archive.unwrap_or(false),
        })
    }
}

fn absolute(path: &Path, operation: &'static str) -> ConfigResult<PathBuf> {
    std::path::absolute(path).map_err(|source| ConfigError::Io {
        operation,
        path: path.to_path_buf(),
        source,
    })
}

/// Caller-supplied overrides layered over the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    /// Directory to scan.
    pub root: Option<PathBuf>,
    /// Descend into subdirectories.
    pub recursive: Option<bool>,
    /// Timestamp compared against the cutoff.
    pub timestamp: Option<TimestampKind>,
    /// Absolute cutoff instant; exclusive with `older_than_days`.
    pub cutoff: Option<DateTime<Utc>>,
    /// Cutoff expressed as an age in days; exclusive with `cutoff`.
    pub older_than_days: Option<u32>,
    /// Directory that receives the archive.
    pub output_dir: Option<PathBuf>,
    /// Explicit archive file name.
    pub output_name: Option<String>,
    /// Container format.
    pub format: Option<ArchiveFormat>,
    /// Compression level for the writer.
    pub compression_level: Option<u32>,
    /// Remove originals after verification.
    pub delete_after_archive: Option<bool>,
}

impl ConfigOverrides {
    /// Layer `other` over `self`; fields set in `other` win.
    ///
    /// The cutoff is treated as one setting: when `other` specifies either
    /// `cutoff` or `older_than_days`, both values from `self` are discarded.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        let (cutoff, older_than_days) = if other.cutoff.is_some() || other.older_than_days.is_some()
        {
            (other.cutoff, other.older_than_days)
        } else {
            (self.cutoff, self.older_than_days)
        };

        Self {
            root: other.root.or(self.root),
            recursive: other.recursive.or(self.recursive),
            timestamp: other.timestamp.or(self.timestamp),
            cutoff,
            older_than_days,
            output_dir: other.output_dir.or(self.output_dir),
            output_name: other.output_name.or(self.output_name),
            format: other.format.or(self.format),
            compression_level: other.compression_level.or(self.compression_level),
            delete_after_archive: other.delete_after_archive.or(self.delete_after_archive),
        }
    }
}
