//! Sequential, deterministic directory walker.
//!
//! Entries within a directory are visited in file-name order, so two walks of
//! the same tree snapshot yield the same sequence. Directories are descended
//! into but never handed to the visitor; only regular files become
//! [`FileCandidate`]s. The first entry error aborts the walk.

#![allow(missing_docs)]

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::{DirEntry, WalkDir};

use crate::core::config::WalkConfig;
use crate::core::errors::Result;
use crate::scanner::filter::FileCandidate;

/// Walker configuration derived from `WalkConfig`.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    pub follow_symlinks: bool,
    /// Depth 0 is the root itself.
    pub max_depth: Option<usize>,
    /// Directories whose subtrees are never entered.
    pub excluded_paths: HashSet<PathBuf>,
}

impl From<&WalkConfig> for WalkerConfig {
    fn from(config: &WalkConfig) -> Self {
        Self {
            follow_symlinks: config.follow_symlinks,
            max_depth: config.max_depth,
            excluded_paths: HashSet::new(),
        }
    }
}

impl WalkerConfig {
    /// Exclude `dir` by both its given and canonical spelling.
    pub fn exclude(&mut self, dir: &Path) {
        if let Ok(canonical) = fs::canonicalize(dir) {
            self.excluded_paths.insert(canonical);
        }
        self.excluded_paths.insert(dir.to_path_buf());
    }
}

/// Counters for one walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WalkStats {
    pub directories: u64,
    pub files: u64,
    /// Symlinks (when not followed), sockets, fifos, devices.
    pub skipped_non_regular: u64,
}

pub struct TreeWalker {
    config: WalkerConfig,
}

impl TreeWalker {
    pub fn new(config: WalkerConfig) -> Self {
        Self { config }
    }

    /// Walk `root`, calling `visit` once per regular file in traversal order.
    ///
    /// Stops at the first traversal error or the first error `visit` returns.
    pub fn walk<F>(&self, root: &Path, mut visit: F) -> Result<WalkStats>
    where
        F: FnMut(FileCandidate) -> Result<()>,
    {
        let mut stats = WalkStats::default();

        let mut walk = WalkDir::new(root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();
        if let Some(depth) = self.config.max_depth {
            walk = walk.max_depth(depth);
        }

        for entry in walk.into_iter().filter_entry(|e| !self.is_excluded(e)) {
            let entry = entry?;
            let file_type = entry.file_type();

            if file_type.is_dir() {
                stats.directories += 1;
                continue;
            }
            if !file_type.is_file() {
                stats.skipped_non_regular += 1;
                tracing::trace!(path = %entry.path().display(), "skipping non-regular entry");
                continue;
            }

            let meta = entry.metadata()?;
            stats.files += 1;
            visit(FileCandidate::from_metadata(entry.into_path(), &meta))?;
        }

        Ok(stats)
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        if self.config.excluded_paths.is_empty() || !entry.file_type().is_dir() {
            return false;
        }
        self.config.excluded_paths.contains(entry.path())
            || fs::canonicalize(entry.path())
                .is_ok_and(|canonical| self.config.excluded_paths.contains(&canonical))
    }
}
