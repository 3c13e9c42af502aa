//! Hard-coded fallbacks applied when no override is supplied.
//!
//! # Design
//! - Keep every default in one place so the CLI help and the resolver agree.
//! - Destructive behaviour defaults to off.

/// Directory scanned when no root is configured.
pub const DEFAULT_ROOT: &str = ".";
/// Directory (relative to the working directory) that receives archives.
pub const DEFAULT_OUTPUT_DIR: &str = "archives";
/// Files untouched for longer than this many days are archived.
pub const DEFAULT_AGE_DAYS: u32 = 30;
/// Maximum compression; both supported codecs accept 0 through 9.
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 9;
/// Upper bound accepted for the compression level.
pub const MAX_COMPRESSION_LEVEL: u32 = 9;
/// Suffix appended to derived archive names before the format extension.
pub const ARCHIVE_NAME_SUFFIX: &str = "archive";
