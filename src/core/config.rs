//! Configuration system: TOML file + env var overrides + smart defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::errors::{FswError, Result};
use crate::logger::audit::AuditFormat;

/// Date format accepted for `filter.modified_since`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Full fswalk configuration model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct Config {
    pub filter: FilterConfig,
    pub action: ActionConfig,
    pub walk: WalkConfig,
}

/// Which files a run acts on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FilterConfig {
    /// Exact extension including the leading dot; empty matches everything.
    pub extension: String,
    /// Files strictly smaller than this are skipped; zero disables the check.
    pub min_size_bytes: u64,
    /// Files modified strictly before midnight UTC of this date are skipped.
    pub modified_since: NaiveDate,
}

/// What a run does with each matched file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ActionConfig {
    /// Explicit report-only run; may not be combined with delete or archive.
    pub list: bool,
    pub delete: bool,
    /// Existing directory that receives gzip copies of matched files.
    pub archive_dir: Option<PathBuf>,
    /// Append-mode destination for the deletion audit log (stderr when unset).
    pub audit_log: Option<PathBuf>,
    pub audit_format: AuditFormat,
    /// gzip level, 0 (store) through 9 (best).
    pub compression_level: u32,
}

/// Traversal knobs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(default)]
pub struct WalkConfig {
    pub follow_symlinks: bool,
    /// Depth 0 is the root itself; `None` walks the whole subtree.
    pub max_depth: Option<usize>,
}

/// The "no date filtering" threshold.
#[must_use]
pub fn far_past() -> NaiveDate {
    NaiveDate::from_ymd_opt(1901, 1, 1).unwrap_or(NaiveDate::MIN)
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            extension: String::new(),
            min_size_bytes: 0,
            modified_since: far_past(),
        }
    }
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            list: false,
            delete: false,
            archive_dir: None,
            audit_log: None,
            audit_format: AuditFormat::Text,
            compression_level: 6,
        }
    }
}

impl Config {
    /// Default configuration path.
    #[must_use]
    pub fn default_path() -> PathBuf {
        let home_dir = env::var_os("HOME").map_or_else(
            || {
                tracing::warn!("HOME not set, falling back to /tmp for the config path");
                PathBuf::from("/tmp")
            },
            PathBuf::from,
        );
        home_dir.join(".config").join("fswalk").join("config.toml")
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// Missing config file is not an error when loading from default path; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| FswError::ConfigParse {
                context: "config file",
                details: format!("{}: {source}", path_buf.display()),
            })?;
            toml::from_str(&raw)?
        } else if path.is_some() {
            return Err(FswError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.apply_env_overrides_from(|name| env::var(name).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Deterministic hash of the effective config for logging.
    ///
    /// FNV-1a over the canonical JSON form, stable across processes.
    pub fn stable_hash(&self) -> Result<String> {
        let canonical = serde_json::to_string(self)?;
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in canonical.as_bytes() {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        Ok(format!("{hash:016x}"))
    }

    /// Apply `FSWALK_*` overrides read through `lookup`. Blank values are ignored.
    pub fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut get = |name: &str| lookup(name).filter(|raw| !raw.trim().is_empty());

        if let Some(raw) = get("FSWALK_EXTENSION") {
            self.filter.extension = raw;
        }
        set_parsed(&mut get, "FSWALK_MIN_SIZE_BYTES", &mut self.filter.min_size_bytes)?;
        if let Some(raw) = get("FSWALK_MODIFIED_SINCE") {
            self.filter.modified_since = parse_date(&raw)?;
        }

        set_parsed(&mut get, "FSWALK_LIST", &mut self.action.list)?;
        set_parsed(&mut get, "FSWALK_DELETE", &mut self.action.delete)?;
        if let Some(raw) = get("FSWALK_ARCHIVE_DIR") {
            self.action.archive_dir = Some(PathBuf::from(raw));
        }
        if let Some(raw) = get("FSWALK_AUDIT_LOG") {
            self.action.audit_log = Some(PathBuf::from(raw));
        }
        set_parsed(&mut get, "FSWALK_AUDIT_FORMAT", &mut self.action.audit_format)?;
        set_parsed(
            &mut get,
            "FSWALK_COMPRESSION_LEVEL",
            &mut self.action.compression_level,
        )?;

        set_parsed(&mut get, "FSWALK_FOLLOW_SYMLINKS", &mut self.walk.follow_symlinks)?;
        if let Some(raw) = get("FSWALK_MAX_DEPTH") {
            self.walk.max_depth = Some(parse_env("FSWALK_MAX_DEPTH", &raw)?);
        }
        Ok(())
    }

    /// Reject configurations the engine would have to guess about.
    pub fn validate(&self) -> Result<()> {
        let ext = &self.filter.extension;
        if !ext.is_empty() && (!ext.starts_with('.') || ext.len() == 1 || ext[1..].contains('.')) {
            return Err(FswError::InvalidConfig {
                details: format!("filter.extension must look like \".log\", got {ext:?}"),
            });
        }

        if let Some(dir) = &self.action.archive_dir {
            if dir.as_os_str().is_empty() {
                return Err(FswError::InvalidConfig {
                    details: "action.archive_dir must not be empty".to_string(),
                });
            }
            if self.action.delete {
                return Err(FswError::InvalidConfig {
                    details: "action.delete and action.archive_dir are mutually exclusive"
                        .to_string(),
                });
            }
        }

        if self.action.list && (self.action.delete || self.action.archive_dir.is_some()) {
            return Err(FswError::InvalidConfig {
                details: "action.list is a report-only run and cannot be combined with delete or archive"
                    .to_string(),
            });
        }

        if self.action.compression_level > 9 {
            return Err(FswError::InvalidConfig {
                details: format!(
                    "action.compression_level must be in [0,9], got {}",
                    self.action.compression_level
                ),
            });
        }

        Ok(())
    }
}

/// Parse a `YYYY-MM-DD` threshold date.
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|error| FswError::ConfigParse {
        context: "date",
        details: format!("{raw:?}: {error} (expected YYYY-MM-DD)"),
    })
}

fn set_parsed<T, F>(lookup: &mut F, name: &str, slot: &mut T) -> Result<()>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: FnMut(&str) -> Option<String>,
{
    if let Some(raw) = lookup(name) {
        *slot = parse_env(name, &raw)?;
    }
    Ok(())
}

fn parse_env<T>(name: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|error| FswError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}
