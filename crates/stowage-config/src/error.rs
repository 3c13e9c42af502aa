//! Error types for configuration resolution.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Primary error type for configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Field contained an invalid value.
    #[error("invalid configuration field")]
    InvalidField {
        /// Field that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
    /// Two mutually exclusive fields were both supplied.
    #[error("conflicting configuration fields")]
    ConflictingFields {
        /// First field supplied.
        first: &'static str,
        /// Second field supplied.
        second: &'static str,
    },
    /// File system operation failed.
    #[error("filesystem operation failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Path involved in the failure.
        path: PathBuf,
        /// Source IO error.
        source: io::Error,
    },
    /// Configuration document could not be parsed.
    #[error("configuration document invalid")]
    Json {
        /// Operation identifier.
        operation: &'static str,
        /// Path of the document.
        path: PathBuf,
        /// Source JSON error.
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub(crate) const fn invalid(
        field: &'static str,
        reason: &'static str,
        value: Option<String>,
    ) -> Self {
        Self::InvalidField {
            field,
            reason,
            value,
        }
    }
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn messages_stay_constant_and_sources_are_preserved() {
        let invalid =
            ConfigError::invalid("compression_level", "out_of_range", Some("12".to_string()));
        assert_eq!(invalid.to_string(), "invalid configuration field");
        assert!(matches!(
            invalid,
            ConfigError::InvalidField {
                field: "compression_level",
                reason: "out_of_range",
                value: Some(ref value),
            } if value == "12"
        ));

        let io_err = ConfigError::Io {
            operation: "resolve.root",
            path: PathBuf::from("root"),
            source: io::Error::other("io"),
        };
        assert!(io_err.source().is_some());
    }
}
