//! Action handlers: report, delete-with-audit, archive-without-delete.
//!
//! Exactly one [`ActionMode`] is resolved per run. Each handler writes to
//! exactly one destination:
//!
//! | mode    | result sink        | audit log        | archive dir   |
//! |---------|--------------------|------------------|---------------|
//! | Report  | matched path       | -                | -             |
//! | Delete  | -                  | one line / file  | -             |
//! | Archive | original path      | -                | `<name>.gz`   |

#![allow(missing_docs)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::config::ActionConfig;
use crate::core::errors::{FswError, Result};
use crate::logger::audit::AuditLog;
use crate::scanner::archive::Archiver;
use crate::scanner::filter::FileCandidate;

/// The single behavior applied to every matched file in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionMode {
    Report,
    Delete,
    Archive(Archiver),
}

/// What happened to one matched file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Listed,
    Deleted,
    Archived { archive_path: PathBuf },
}

impl ActionMode {
    /// Archive wins over delete, delete over report.
    pub fn resolve(config: &ActionConfig) -> Self {
        match &config.archive_dir {
            Some(dir) => Self::Archive(Archiver::new(dir, config.compression_level)),
            None if config.delete => Self::Delete,
            None => Self::Report,
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Report => "report",
            Self::Delete => "delete",
            Self::Archive(_) => "archive",
        }
    }

    /// Run this mode's handler on one matched file.
    pub fn apply<O, A>(
        &self,
        candidate: &FileCandidate,
        out: &mut O,
        audit: &mut AuditLog<A>,
    ) -> Result<ActionOutcome>
    where
        O: Write + ?Sized,
        A: Write,
    {
        match self {
            Self::Report => {
                list_file(&candidate.path, out)?;
                Ok(ActionOutcome::Listed)
            }
            Self::Delete => {
                delete_file(candidate, audit)?;
                Ok(ActionOutcome::Deleted)
            }
            Self::Archive(archiver) => {
                let archive_path = archiver.archive(&candidate.path)?;
                list_file(&candidate.path, out)?;
                Ok(ActionOutcome::Archived { archive_path })
            }
        }
    }
}

/// Write `path` and a newline to the result sink.
pub fn list_file<O: Write + ?Sized>(path: &Path, out: &mut O) -> Result<()> {
    writeln!(out, "{}", path.display()).map_err(|source| FswError::sink("result", source))
}

/// Remove the file, then record it. A failed removal writes no audit line.
pub fn delete_file<A: Write>(candidate: &FileCandidate, audit: &mut AuditLog<A>) -> Result<()> {
    fs::remove_file(&candidate.path).map_err(|source| FswError::Delete {
        path: candidate.path.clone(),
        source,
    })?;
    audit.record_deletion(&candidate.path, candidate.size_bytes)
}
