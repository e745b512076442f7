//! File filter: extension, minimum size, and modification-time predicates.
//!
//! A candidate is acted upon only when it passes every active predicate. An
//! empty extension, a zero minimum size, and a far-past date threshold are
//! each vacuously true, so the default criteria match every regular file.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{NaiveDate, NaiveTime};

use crate::core::config::FilterConfig;

/// Metadata snapshot of one traversal step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCandidate {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub modified: SystemTime,
    pub is_dir: bool,
}

impl FileCandidate {
    pub fn from_metadata(path: impl Into<PathBuf>, meta: &fs::Metadata) -> Self {
        Self {
            path: path.into(),
            size_bytes: meta.len(),
            modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            is_dir: meta.is_dir(),
        }
    }
}

/// Why a candidate was filtered out. Checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exclusion {
    Directory,
    Extension,
    Size,
    ModifiedBefore,
}

impl Exclusion {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Directory => "directory",
            Self::Extension => "extension",
            Self::Size => "size",
            Self::ModifiedBefore => "modified_before",
        }
    }
}

/// Immutable predicate set for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Extension including its leading dot; empty disables the check.
    extension: String,
    min_size_bytes: u64,
    modified_since: SystemTime,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}

impl FilterCriteria {
    /// `extension` is given with its leading dot (`".log"`), or empty. A value
    /// without the dot never equals a file extension and matches nothing.
    pub fn new(extension: &str, min_size_bytes: u64, modified_since: SystemTime) -> Self {
        Self {
            extension: extension.to_string(),
            min_size_bytes,
            modified_since,
        }
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        Self::new(
            &config.extension,
            config.min_size_bytes,
            date_threshold(config.modified_since),
        )
    }

    /// First predicate that rejects `candidate`, or `None` if it matches.
    pub fn exclusion(&self, candidate: &FileCandidate) -> Option<Exclusion> {
        if candidate.is_dir {
            return Some(Exclusion::Directory);
        }
        if !self.extension_matches(&candidate.path) {
            return Some(Exclusion::Extension);
        }
        if self.min_size_bytes > 0 && candidate.size_bytes < self.min_size_bytes {
            return Some(Exclusion::Size);
        }
        if candidate.modified < self.modified_since {
            return Some(Exclusion::ModifiedBefore);
        }
        None
    }

    pub fn matches(&self, candidate: &FileCandidate) -> bool {
        self.exclusion(candidate).is_none()
    }

    fn extension_matches(&self, path: &Path) -> bool {
        self.extension.is_empty() || file_extension(path) == Some(self.extension.as_bytes())
    }
}

/// Suffix of the base name starting at its last `.`, dot included.
///
/// Unlike [`Path::extension`], a dotfile such as `.log` has the extension
/// `.log`, and `name.` has the extension `.`.
pub fn file_extension(path: &Path) -> Option<&[u8]> {
    let name = path.file_name()?.as_encoded_bytes();
    let dot = name.iter().rposition(|&b| b == b'.')?;
    Some(&name[dot..])
}

/// Midnight UTC at the start of `date`.
pub fn date_threshold(date: NaiveDate) -> SystemTime {
    SystemTime::from(date.and_time(NaiveTime::MIN).and_utc())
}
