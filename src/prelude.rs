//! Convenience re-exports for library consumers.
//!
//! ```rust,no_run
//! use fswalk::prelude::*;
//! ```

// Core
pub use crate::core::config::{ActionConfig, Config, FilterConfig, WalkConfig};
pub use crate::core::errors::{ErrorCategory, FswError, Result};

// Logger
pub use crate::logger::audit::{AuditFormat, AuditLog};

// Scanner
pub use crate::scanner::actions::{ActionMode, ActionOutcome};
pub use crate::scanner::archive::Archiver;
pub use crate::scanner::filter::{Exclusion, FileCandidate, FilterCriteria};
pub use crate::scanner::sweep::{SweepOptions, SweepReport, run};
pub use crate::scanner::walker::{TreeWalker, WalkStats, WalkerConfig};
