//! CLI error type and exit codes.

use std::fmt::{self, Display, Formatter};

use anyhow::anyhow;
use stowage_config::ConfigError;
use stowage_fsops::FsOpsError;

/// CLI-level error type separating bad input, operational failures, and degraded runs.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
    Unverified(String),
    PartialDeletion(usize),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) fn config(error: &ConfigError) -> Self {
        Self::Validation(describe_config(error))
    }

    pub(crate) fn fsops(error: &FsOpsError) -> Self {
        match error {
            FsOpsError::Config { source, .. } => Self::config(source),
            FsOpsError::InvalidInput {
                field,
                reason,
                value,
            } => Self::Validation(describe_field(field, reason, value.as_deref())),
            FsOpsError::Io {
                operation, path, ..
            }
            | FsOpsError::Zip {
                operation, path, ..
            } => Self::Failure(anyhow!(
                "{operation} failed for {}: {}",
                path.display(),
                error.chain_message()
            )),
            FsOpsError::Join { operation, .. } => Self::Failure(anyhow!(
                "{operation} failed: {}",
                error.chain_message()
            )),
        }
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
            Self::Unverified(_) => 4,
            Self::PartialDeletion(_) => 5,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) | Self::Unverified(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
            Self::PartialDeletion(count) => {
                format!("{count} archived file(s) could not be removed")
            }
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

fn describe_config(error: &ConfigError) -> String {
    match error {
        ConfigError::InvalidField {
            field,
            reason,
            value,
        } => describe_field(field, reason, value.as_deref()),
        ConfigError::ConflictingFields { first, second } => {
            format!("{first} and {second} cannot both be set")
        }
        ConfigError::Io {
            operation, path, source,
        } => format!("{operation} failed for {}: {source}", path.display()),
        ConfigError::Json {
            operation, path, source,
        } => format!("{operation} failed for {}: invalid JSON: {source}", path.display()),
    }
}

fn describe_field(field: &str, reason: &str, value: Option<&str>) -> String {
    value.map_or_else(
        || format!("invalid {field}: {reason}"),
        |value| format!("invalid {field} '{value}': {reason}"),
    )
}
