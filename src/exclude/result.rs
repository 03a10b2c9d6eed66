use crate::core::ExcludeError;
use std::path::{Path, PathBuf};

/// Outcome of probing one requested module name under the modules directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDirectory {
    pub name: String,
    pub original_path: PathBuf,
    pub exists: bool,
}

/// A directory that was moved out of place and where it went
///
/// `staged_path` always sits directly under the staging root and keeps the
/// basename of `original_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedDirectory {
    pub original_path: PathBuf,
    pub staged_path: PathBuf,
}

impl StagedDirectory {
    /// Compute the staged location of `original` under `dest_root`.
    ///
    /// Returns `None` when `original` has no basename (e.g. `/` or `..`).
    pub fn plan(original: &Path, dest_root: &Path) -> Option<Self> {
        let name = original.file_name()?;
        Some(Self {
            original_path: original.to_path_buf(),
            staged_path: dest_root.join(name),
        })
    }
}

/// Raw manifest bytes captured before any edit, written back verbatim on restore
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestSnapshot {
    path: PathBuf,
    content: Vec<u8>,
}

impl ManifestSnapshot {
    pub fn new(path: PathBuf, content: Vec<u8>) -> Self {
        Self { path, content }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

/// Everything a run produced, handed back to the caller
#[derive(Debug, Default)]
pub struct RunResult {
    /// True only when the external command exited with status zero
    pub command_succeeded: bool,
    /// Exit code of the command, if it ran to completion
    pub exit_code: Option<i32>,
    /// Errors recorded while staging (moves, manifest edit)
    pub staging_errors: Vec<ExcludeError>,
    /// Errors recorded while putting things back
    pub restore_errors: Vec<ExcludeError>,
    /// Directories that were moved to the staging root for the command
    pub staged: Vec<StagedDirectory>,
    /// Requested names with no directory under the modules directory
    pub skipped: Vec<String>,
}

impl RunResult {
    /// Command succeeded and the project was fully restored
    pub fn is_success(&self) -> bool {
        self.command_succeeded && self.is_restored()
    }

    /// No restore step failed, so the project is back in its original state
    pub fn is_restored(&self) -> bool {
        self.restore_errors.is_empty()
    }
}
