//! FSW-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, FswError>;

/// Coarse error taxonomy: when in the run did the failure happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad or missing configuration; surfaced before any traversal.
    Validation,
    /// A directory entry could not be read mid-walk.
    Traversal,
    /// The selected action failed on a matched file.
    Action,
}

/// Top-level error type for fswalk.
#[derive(Debug, Error)]
pub enum FswError {
    #[error("[FSW-1001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[FSW-1002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[FSW-1003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[FSW-2001] traversal failure at {path}: {source}")]
    Traversal {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("[FSW-2101] serialization failure in {context}: {details}")]
    Serialization {
        context: &'static str,
        details: String,
    },

    #[error("[FSW-3001] delete failed for {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("[FSW-3002] archive failed for {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("[FSW-3003] write to {sink} sink failed: {source}")]
    Sink {
        sink: &'static str,
        #[source]
        source: io::Error,
    },
}

impl FswError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidConfig { .. } => "FSW-1001",
            Self::MissingConfig { .. } => "FSW-1002",
            Self::ConfigParse { .. } => "FSW-1003",
            Self::Traversal { .. } => "FSW-2001",
            Self::Serialization { .. } => "FSW-2101",
            Self::Delete { .. } => "FSW-3001",
            Self::Archive { .. } => "FSW-3002",
            Self::Sink { .. } => "FSW-3003",
        }
    }

    /// Which phase of a run this error belongs to.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidConfig { .. } | Self::MissingConfig { .. } | Self::ConfigParse { .. } => {
                ErrorCategory::Validation
            }
            Self::Traversal { .. } => ErrorCategory::Traversal,
            Self::Serialization { .. }
            | Self::Delete { .. }
            | Self::Archive { .. }
            | Self::Sink { .. } => ErrorCategory::Action,
        }
    }

    /// Convenience constructor for traversal errors with a known path.
    #[must_use]
    pub fn traversal(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Traversal {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Convenience constructor for result/audit sink write failures.
    #[must_use]
    pub const fn sink(sink: &'static str, source: io::Error) -> Self {
        Self::Sink { sink, source }
    }
}

impl From<walkdir::Error> for FswError {
    fn from(value: walkdir::Error) -> Self {
        let path = value.path().map(Path::to_path_buf).unwrap_or_default();
        let source = if value.io_error().is_some() {
            value
                .into_io_error()
                .unwrap_or_else(|| io::Error::other("directory walk failed"))
        } else {
            // Loop detection carries no io::Error of its own.
            io::Error::other(value.to_string())
        };
        Self::Traversal { path, source }
    }
}

impl From<serde_json::Error> for FswError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization {
            context: "serde_json",
            details: value.to_string(),
        }
    }
}

impl From<toml::de::Error> for FswError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
