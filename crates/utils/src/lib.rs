//! Shared utilities for vaultkv
//!
//! File helpers used by the tokio-backed file store and the tracing
//! initialiser for embedders that do not install their own subscriber.

pub mod atomic_file;
pub mod tracing;

pub use atomic_file::*;
