//! Top-level CLI definition and dispatch.

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use colored::{Colorize, control};
use thiserror::Error;

use fswalk::core::config::{Config, parse_date};
use fswalk::core::errors::{ErrorCategory, FswError};
use fswalk::logger::audit::AuditFormat;
use fswalk::scanner::actions::ActionMode;
use fswalk::scanner::sweep::{self, SweepOptions, SweepReport};

/// Find files under a directory and list, delete, or archive them.
#[derive(Debug, Parser)]
#[command(
    name = "fswalk",
    author,
    version,
    about = "Walk a directory tree and list, delete, or archive matching files",
    long_about = None
)]
pub struct Cli {
    /// Root directory to start the walk from.
    #[arg(long, default_value = ".", value_name = "PATH")]
    root: PathBuf,
    /// Only act on files with this extension, including the dot (e.g. ".log").
    #[arg(long, value_name = "EXT")]
    ext: Option<String>,
    /// Skip files smaller than this many bytes.
    #[arg(long, value_name = "BYTES")]
    size: Option<u64>,
    /// Skip files modified before this date (YYYY-MM-DD, midnight UTC).
    #[arg(long, value_name = "DATE")]
    date: Option<String>,
    /// List matching files only; never delete or archive.
    #[arg(long)]
    list: bool,
    /// Delete matching files.
    #[arg(long)]
    del: bool,
    /// Append the deletion audit log to this file instead of stderr.
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,
    /// Write gzip copies of matching files into this existing directory.
    #[arg(long, value_name = "DIR")]
    archive: Option<PathBuf>,
    /// Audit log line format: text or jsonl.
    #[arg(long, value_name = "FORMAT")]
    audit_format: Option<AuditFormat>,
    /// gzip compression level for --archive (0-9).
    #[arg(long, value_name = "LEVEL")]
    compression_level: Option<u32>,
    /// Follow symbolic links while walking.
    #[arg(long)]
    follow_symlinks: bool,
    /// Do not descend more than this many levels below the root.
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,
    /// Override config file path.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Print a run summary to stderr when done.
    #[arg(long)]
    summary: bool,
    /// Print the summary as JSON.
    #[arg(long, requires = "summary")]
    json: bool,
    /// Disable colored output.
    #[arg(long)]
    no_color: bool,
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,
    /// Quiet mode (errors only).
    #[arg(short, long)]
    quiet: bool,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Engine or configuration failure.
    #[error(transparent)]
    Sweep(#[from] FswError),
    /// The audit log file could not be opened.
    #[error("failed to open audit log {path}: {source}")]
    AuditLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// JSON serialization failed.
    #[error("failed to serialize summary: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Sweep(err) => match err.category() {
                ErrorCategory::Validation => 1,
                ErrorCategory::Traversal => 2,
                ErrorCategory::Action => 3,
            },
            Self::AuditLog { .. } => 1,
            Self::Json(_) | Self::Io(_) => 3,
        }
    }
}

/// Print a failed run's error to stderr.
pub fn report_error(cli: &Cli, err: &CliError) {
    if cli.no_color {
        control::set_override(false);
    }
    eprintln!("{} {err}", "fswalk:".red().bold());
}

/// Resolve configuration and run one sweep.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }
    setup_logging(cli.verbose, cli.quiet);

    let mut config = Config::load(cli.config.as_deref())?;
    apply_cli_overrides(&mut config, cli)?;
    let options = SweepOptions::from_config(&config)?;

    let mut audit: Box<dyn Write> = match (&options.mode, &config.action.audit_log) {
        (ActionMode::Delete, Some(path)) => Box::new(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| CliError::AuditLog {
                    path: path.clone(),
                    source,
                })?,
        ),
        _ => Box::new(io::stderr()),
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let report = sweep::run(&cli.root, &mut out, audit.as_mut(), &options)?;
    out.flush()?;

    if cli.summary {
        print_summary(&report, cli.json)?;
    }
    Ok(())
}

fn apply_cli_overrides(config: &mut Config, cli: &Cli) -> Result<(), CliError> {
    if let Some(ext) = &cli.ext {
        config.filter.extension.clone_from(ext);
    }
    if let Some(size) = cli.size {
        config.filter.min_size_bytes = size;
    }
    if let Some(date) = &cli.date {
        config.filter.modified_since = parse_date(date)?;
    }
    if cli.list {
        config.action.list = true;
    }
    if cli.del {
        config.action.delete = true;
    }
    if let Some(log) = &cli.log {
        config.action.audit_log = Some(log.clone());
    }
    if let Some(archive) = &cli.archive {
        config.action.archive_dir = Some(archive.clone());
    }
    if let Some(format) = cli.audit_format {
        config.action.audit_format = format;
    }
    if let Some(level) = cli.compression_level {
        config.action.compression_level = level;
    }
    if cli.follow_symlinks {
        config.walk.follow_symlinks = true;
    }
    if let Some(depth) = cli.max_depth {
        config.walk.max_depth = Some(depth);
    }
    Ok(())
}

fn print_summary(report: &SweepReport, json: bool) -> Result<(), CliError> {
    let mut err = io::stderr().lock();
    if json {
        writeln!(err, "{}", serde_json::to_string_pretty(report)?)?;
        return Ok(());
    }

    writeln!(
        err,
        "{} {} mode: matched {} of {} files ({} bytes) in {} ms",
        "summary:".bold(),
        report.mode,
        report.files_matched,
        report.walk.files,
        report.bytes_matched,
        report.elapsed_ms,
    )?;
    writeln!(
        err,
        "  listed {}, deleted {}, archived {}; excluded by extension {}, size {}, date {}",
        report.files_listed,
        report.files_deleted,
        report.files_archived,
        report.excluded.extension,
        report.excluded.size,
        report.excluded.modified_before,
    )?;
    Ok(())
}

fn setup_logging(verbose: u8, quiet: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = if quiet {
            "error"
        } else {
            match verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        };
        tracing_subscriber::EnvFilter::new(level)
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
