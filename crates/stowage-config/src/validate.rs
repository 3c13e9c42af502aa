//! Validation helpers applied while resolving overrides.

use std::path::{Component, Path};

use crate::defaults::MAX_COMPRESSION_LEVEL;
use crate::error::{ConfigError, ConfigResult};

#[allow(clippy::redundant_pub_crate)]
pub(crate) fn validate_root(root: &Path) -> ConfigResult<()> {
    if root.as_os_str().is_empty() {
        return Err(ConfigError::invalid("root", "empty", None));
    }
    Ok(())
}

#[allow(clippy::redundant_pub_crate)]
pub(crate) fn validate_age_days(days: u32) -> ConfigResult<()> {
    if days == 0 {
        return Err(ConfigError::invalid(
            "older_than_days",
            "must_be_positive",
            Some(days.to_string()),
        ));
    }
    Ok(())
}

#[allow(clippy::redundant_pub_crate)]
pub(crate) fn validate_compression_level(level: u32) -> ConfigResult<()> {
    if level > MAX_COMPRESSION_LEVEL {
        return Err(ConfigError::invalid(
            "compression_level",
            "out_of_range",
            Some(level.to_string()),
        ));
    }
    Ok(())
}

/// Archive names must be a single plain path segment inside the output directory.
#[allow(clippy::redundant_pub_crate)]
pub(crate) fn validate_output_name(name: &str) -> ConfigResult<()> {
    if name.trim().is_empty() {
        return Err(ConfigError::invalid("output_name", "empty", None));
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
        _ => Err(ConfigError::invalid(
            "output_name",
            "not_a_file_name",
            Some(name.to_string()),
        )),
    }
}
