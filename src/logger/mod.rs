//! Append-only deletion audit log.

pub mod audit;
