#![forbid(unsafe_code)]

//! fswalk: directory-tree housekeeping.
//!
//! Walks a subtree, filters every regular file by extension, minimum size, and
//! modification time, and applies exactly one action to each match:
//! 1. **Report**: write the path to the result sink
//! 2. **Delete**: remove the file and append a line to the audit log
//! 3. **Archive**: write a gzip copy into an archive directory, keeping the original
//!
//! # Library usage
//!
//! ```rust,no_run
//! use fswalk::prelude::*;
//!
//! let config = Config::load(None)?;
//! let options = SweepOptions::from_config(&config)?;
//! let mut stdout = std::io::stdout().lock();
//! let report = run(std::path::Path::new("/var/tmp"), &mut stdout, &mut std::io::sink(), &options)?;
//! eprintln!("{} files matched", report.files_matched);
//! # Ok::<(), FswError>(())
//! ```

pub mod prelude;

pub mod core;
pub mod logger;
pub mod scanner;
