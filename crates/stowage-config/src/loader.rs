//! Loading override documents from disk.
//!
//! # Design
//! - Documents are plain JSON objects mirroring `ConfigOverrides`; unknown keys are rejected.
//! - Loading never applies defaults; resolution happens once in `ArchiveConfig::resolve`.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::ConfigOverrides;

/// Read a JSON override document.
///
/// # Errors
///
/// Returns an error when the file cannot be read or does not parse as `ConfigOverrides`.
pub fn load_overrides(path: &Path) -> ConfigResult<ConfigOverrides> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        operation: "load_overrides.read",
        path: path.to_path_buf(),
        source,
    })?;
    let overrides =
        serde_json::from_str::<ConfigOverrides>(&raw).map_err(|source| ConfigError::Json {
            operation: "load_overrides.parse",
            path: path.to_path_buf(),
            source,
        })?;
    debug!(path = %path.display(), "loaded configuration overrides");
    Ok(overrides)
}
