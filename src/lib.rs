//! npm-exclude: run `npm install` / `npm update` with some installed modules
//! temporarily hidden.
//!
//! This crate provides the library behind the `npm-exclude` binary,
//! re-exporting the error types and path helpers from `npm-exclude-core`.

pub use npm_exclude_core::{format_error_with_help, ErrorHelp, ExcludeError, ExcludeResult};

/// Core module re-exported from npm-exclude-core.
pub mod core {
    pub use npm_exclude_core::core::*;
}

/// Configuration management.
pub mod config;

/// Staging, execution and restore.
pub mod exclude;
