//! Run entry point: walk one root, filter each file, apply one action.
//!
//! Processing is strictly sequential: each file is fully filtered and acted
//! upon before the walker moves on. The first error aborts the run and is
//! returned; side effects from earlier files (deleted files, audit lines,
//! archives, result lines) are not rolled back.

#![allow(missing_docs)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::Serialize;

use crate::core::config::Config;
use crate::core::errors::{FswError, Result};
use crate::logger::audit::{AuditFormat, AuditLog};
use crate::scanner::actions::{ActionMode, ActionOutcome};
use crate::scanner::filter::{Exclusion, FilterCriteria};
use crate::scanner::walker::{TreeWalker, WalkStats, WalkerConfig};

/// Everything a run needs besides its root and sinks. Read-only during the walk.
#[derive(Debug, Clone)]
pub struct SweepOptions {
    pub filter: FilterCriteria,
    pub mode: ActionMode,
    pub walker: WalkerConfig,
    pub audit_format: AuditFormat,
    /// Fingerprint of the config these options came from, for logs.
    pub config_hash: Option<String>,
}

impl SweepOptions {
    pub fn new(filter: FilterCriteria, mode: ActionMode) -> Self {
        Self {
            filter,
            mode,
            walker: WalkerConfig::default(),
            audit_format: AuditFormat::default(),
            config_hash: None,
        }
    }

    /// Validate `config` and resolve it into run options.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            filter: FilterCriteria::from_config(&config.filter),
            mode: ActionMode::resolve(&config.action),
            walker: WalkerConfig::from(&config.walk),
            audit_format: config.action.audit_format,
            config_hash: Some(config.stable_hash()?),
        })
    }
}

/// Files rejected, by the predicate that rejected them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExclusionCounts {
    pub extension: u64,
    pub size: u64,
    pub modified_before: u64,
}

impl ExclusionCounts {
    fn record(&mut self, exclusion: Exclusion) {
        match exclusion {
            Exclusion::Extension => self.extension += 1,
            Exclusion::Size => self.size += 1,
            Exclusion::ModifiedBefore => self.modified_before += 1,
            // The walker never submits directories.
            Exclusion::Directory => {}
        }
    }

    pub const fn total(&self) -> u64 {
        self.extension + self.size + self.modified_before
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub root: PathBuf,
    pub mode: &'static str,
    pub walk: WalkStats,
    pub files_matched: u64,
    pub bytes_matched: u64,
    pub excluded: ExclusionCounts,
    pub files_listed: u64,
    pub files_deleted: u64,
    pub files_archived: u64,
    pub elapsed_ms: u64,
}

/// Walk `root` and apply `options.mode` to every matching regular file.
///
/// `out` receives matched paths (report mode) or archived source paths
/// (archive mode). `audit` receives one line per deleted file (delete mode).
pub fn run<O>(
    root: &Path,
    out: &mut O,
    audit: &mut dyn Write,
    options: &SweepOptions,
) -> Result<SweepReport>
where
    O: Write + ?Sized,
{
    if root.as_os_str().is_empty() {
        return Err(FswError::InvalidConfig {
            details: "root path must not be empty".to_string(),
        });
    }

    let start = Instant::now();
    let mut walker_config = options.walker.clone();
    if let ActionMode::Archive(archiver) = &options.mode {
        if lies_within(root, archiver.dir()) {
            return Err(FswError::InvalidConfig {
                details: format!(
                    "archive directory {} contains the root {}",
                    archiver.dir().display(),
                    root.display()
                ),
            });
        }
        // Never re-archive our own output when the archive lives under root.
        walker_config.exclude(archiver.dir());
    }
    let walker = TreeWalker::new(walker_config);
    let mut audit_log = AuditLog::new(audit, options.audit_format);

    tracing::info!(
        root = %root.display(),
        mode = options.mode.label(),
        config_hash = options.config_hash.as_deref().unwrap_or("-"),
        "sweep starting"
    );

    let mut report = SweepReport {
        root: root.to_path_buf(),
        mode: options.mode.label(),
        walk: WalkStats::default(),
        files_matched: 0,
        bytes_matched: 0,
        excluded: ExclusionCounts::default(),
        files_listed: 0,
        files_deleted: 0,
        files_archived: 0,
        elapsed_ms: 0,
    };

    let walked = walker.walk(root, |candidate| {
        if let Some(exclusion) = options.filter.exclusion(&candidate) {
            tracing::trace!(
                path = %candidate.path.display(),
                reason = exclusion.as_str(),
                "excluded"
            );
            report.excluded.record(exclusion);
            return Ok(());
        }

        report.files_matched += 1;
        report.bytes_matched += candidate.size_bytes;

        match options.mode.apply(&candidate, &mut *out, &mut audit_log)? {
            ActionOutcome::Listed => {
                report.files_listed += 1;
                tracing::debug!(path = %candidate.path.display(), "listed");
            }
            ActionOutcome::Deleted => {
                report.files_deleted += 1;
                tracing::debug!(
                    path = %candidate.path.display(),
                    size = candidate.size_bytes,
                    "deleted"
                );
            }
            ActionOutcome::Archived { archive_path } => {
                report.files_archived += 1;
                tracing::debug!(
                    path = %candidate.path.display(),
                    archive = %archive_path.display(),
                    "archived"
                );
            }
        }
        Ok(())
    });

    report.walk = match walked {
        Ok(stats) => stats,
        Err(err) => {
            tracing::warn!(
                code = err.code(),
                matched = report.files_matched,
                "sweep aborted: {err}"
            );
            return Err(err);
        }
    };
    out.flush().map_err(|source| FswError::sink("result", source))?;

    report.elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
    tracing::info!(
        files = report.walk.files,
        matched = report.files_matched,
        excluded = report.excluded.total(),
        elapsed_ms = report.elapsed_ms,
        "sweep complete"
    );
    Ok(report)
}

/// True when `root` is `dir` itself or lies beneath it.
fn lies_within(root: &Path, dir: &Path) -> bool {
    if root.starts_with(dir) {
        return true;
    }
    match (fs::canonicalize(root), fs::canonicalize(dir)) {
        (Ok(root), Ok(dir)) => root.starts_with(dir),
        _ => false,
    }
}
