//! Core utilities shared by the npm-exclude binary and library.
//!
//! Holds the error taxonomy and the platform/project path helpers.

pub mod core;

pub use crate::core::{format_error_with_help, ErrorHelp, ExcludeError, ExcludeResult};
