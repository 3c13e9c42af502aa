//! Argument parsing, configuration layering, and command dispatch.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use stowage_config::{ArchiveConfig, ArchiveFormat, ConfigOverrides, TimestampKind, load_overrides};
use stowage_fsops::ArchiveOrchestrator;
use stowage_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, Metrics, init_logging};

use crate::commands::{handle_archive, handle_check, handle_scan};
use crate::error::{CliError, CliResult};

/// Parses CLI arguments, installs logging, executes the requested command,
/// and returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.map_or_else(LogFormat::infer, LogFormat::from),
    };
    if let Err(err) = init_logging(&logging) {
        let err = CliError::failure(err);
        eprintln!("error: {}", err.display_message());
        return err.exit_code();
    }

    match execute(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

pub(crate) async fn execute(cli: Cli) -> CliResult<()> {
    let config = resolve_config(&cli.config, &cli.command)?;
    let metrics = Metrics::new().map_err(CliError::failure)?;
    let mut orchestrator = ArchiveOrchestrator::new(config, metrics.clone());

    let result = match cli.command {
        Command::Scan => handle_scan(&mut orchestrator, cli.output).await,
        Command::Archive(_) => handle_archive(&mut orchestrator, cli.output).await,
        Command::Check => handle_check(&mut orchestrator, cli.output).await,
    };

    if cli.metrics {
        let text = metrics.render().map_err(CliError::failure)?;
        eprint!("{text}");
    }
    result
}

/// Layer file overrides, flag overrides, and command-implied settings into a resolved config.
pub(crate) fn resolve_config(args: &ConfigArgs, command: &Command) -> CliResult<ArchiveConfig> {
    let from_file = match &args.config {
        Some(path) => load_overrides(path).map_err(|err| CliError::config(&err))?,
        None => ConfigOverrides::default(),
    };
    let mut overrides = from_file.merge(args.overrides());
    match command {
        Command::Archive(ArchiveArgs { delete: true }) => {
            overrides.delete_after_archive = Some(true);
        }
        Command::Check => overrides.delete_after_archive = Some(false),
        Command::Scan | Command::Archive(_) => {}
    }
    ArchiveConfig::resolve(overrides).map_err(|err| CliError::config(&err))
}

#[derive(Parser)]
#[command(
    name = "stowage",
    about = "Archive files older than a cutoff and optionally remove the originals"
)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: ConfigArgs,
    #[arg(
        long = "output",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for command results"
    )]
    pub(crate) output: OutputFormat,
    #[arg(long, global = true, env = "STOWAGE_LOG", default_value = DEFAULT_LOG_LEVEL)]
    pub(crate) log_level: String,
    #[arg(long, global = true, value_enum)]
    pub(crate) log_format: Option<LogFormatArg>,
    #[arg(long, global = true, help = "Print Prometheus metrics to stderr after the command")]
    pub(crate) metrics: bool,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ConfigArgs {
    #[arg(long, global = true, env = "STOWAGE_CONFIG", help = "JSON file with configuration overrides")]
    pub(crate) config: Option<PathBuf>,
    #[arg(long, global = true)]
    pub(crate) root: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        overrides_with = "no_recursive",
        help = "Descend into subdirectories of the root"
    )]
    pub(crate) recursive: bool,
    #[arg(
        long,
        global = true,
        overrides_with = "recursive",
        help = "Only consider direct children of the root"
    )]
    pub(crate) no_recursive: bool,
    #[arg(long, global = true, value_parser = parse_timestamp_kind)]
    pub(crate) timestamp: Option<TimestampKind>,
    #[arg(long, global = true, conflicts_with = "cutoff")]
    pub(crate) older_than_days: Option<u32>,
    #[arg(long, global = true, value_parser = parse_cutoff, help = "RFC 3339 instant")]
    pub(crate) cutoff: Option<DateTime<Utc>>,
    #[arg(long, global = true)]
    pub(crate) output_dir: Option<PathBuf>,
    #[arg(long, global = true)]
    pub(crate) output_name: Option<String>,
    #[arg(long, global = true, value_parser = parse_archive_format)]
    pub(crate) format: Option<ArchiveFormat>,
    #[arg(long, global = true, help = "Compression level, 0 through 9")]
    pub(crate) level: Option<u32>,
}

impl ConfigArgs {
    /// `Some` only when one of the paired flags was given; the last one wins.
    const fn recursion(&self) -> Option<bool> {
        if self.recursive {
            Some(true)
        } else if self.no_recursive {
            Some(false)
        } else {
            None
        }
    }

    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            root: self.root.clone(),
            recursive: self.recursion(),
            timestamp: self.timestamp,
            cutoff: self.cutoff,
            older_than_days: self.older_than_days,
            output_dir: self.output_dir.clone(),
            output_name: self.output_name.clone(),
            format: self.format,
            compression_level: self.level,
            delete_after_archive: None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// List the files older than the cutoff.
    Scan,
    /// Scan, build and verify an archive, then optionally delete the originals.
    Archive(ArchiveArgs),
    /// Scan, build and verify an archive without deleting anything.
    Check,
}

#[derive(Args, Debug)]
pub(crate) struct ArchiveArgs {
    #[arg(long, help = "Remove originals after the archive verifies")]
    pub(crate) delete: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogFormatArg {
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(value: LogFormatArg) -> Self {
        match value {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Json => Self::Json,
        }
    }
}

fn parse_timestamp_kind(value: &str) -> Result<TimestampKind, String> {
    value
        .parse()
        .map_err(|_| format!("expected one of birth, change, modify, access; got '{value}'"))
}

fn parse_archive_format(value: &str) -> Result<ArchiveFormat, String> {
    value
        .parse()
        .map_err(|_| format!("expected zip or tar.gz; got '{value}'"))
}

fn parse_cutoff(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| format!("invalid RFC 3339 timestamp '{value}': {err}"))
}
