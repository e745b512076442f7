//! Housekeeping engine: directory walker, file filter, action handlers, archiver.

pub mod actions;
pub mod archive;
pub mod filter;
pub mod sweep;
pub mod walker;
