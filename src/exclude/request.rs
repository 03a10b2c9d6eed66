use crate::core::path::{default_temp_root, normalize_path};
use crate::core::{ExcludeError, ExcludeResult};
use std::path::{Path, PathBuf};

/// Default external command
pub const DEFAULT_COMMAND: &str = "npm";

/// One exclusion run: which modules to hide, where they live, and what to execute
///
/// Built once and never mutated while a run is in progress.
#[derive(Debug, Clone)]
pub struct ExclusionRequest {
    module_dir: PathBuf,
    manifest_path: PathBuf,
    temp_root: PathBuf,
    excluded: Vec<String>,
    command: String,
    command_args: Vec<String>,
    cwd: Option<PathBuf>,
}

impl ExclusionRequest {
    /// Create a request that runs `npm install` with the default staging root
    ///
    /// Module names are trimmed here so every component sees the same name.
    pub fn new(
        module_dir: impl Into<PathBuf>,
        manifest_path: impl Into<PathBuf>,
        excluded: Vec<String>,
    ) -> Self {
        Self {
            module_dir: module_dir.into(),
            manifest_path: manifest_path.into(),
            temp_root: default_temp_root(),
            excluded: excluded
                .into_iter()
                .map(|name| name.trim().to_string())
                .collect(),
            command: DEFAULT_COMMAND.to_string(),
            command_args: vec!["install".to_string()],
            cwd: None,
        }
    }

    pub fn with_temp_root(mut self, temp_root: impl Into<PathBuf>) -> Self {
        self.temp_root = temp_root.into();
        self
    }

    pub fn with_command(mut self, command: impl Into<String>, args: Vec<String>) -> Self {
        self.command = command.into();
        self.command_args = args;
        self
    }

    /// Working directory for the command (inherited when unset)
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn module_dir(&self) -> &Path {
        &self.module_dir
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn temp_root(&self) -> &Path {
        &self.temp_root
    }

    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn command_args(&self) -> &[String] {
        &self.command_args
    }

    pub fn cwd(&self) -> Option<&Path> {
        self.cwd.as_deref()
    }

    /// Check the request before anything is touched.
    ///
    /// The manifest must exist; whether it can be read is only found out when
    /// staging. The modules directory does not have to exist.
    pub fn validate(&self) -> ExcludeResult<()> {
        if self.excluded.is_empty() {
            return Err(ExcludeError::Validation(
                "At least one module to exclude is required".to_string(),
            ));
        }

        if self.excluded.iter().all(|name| name.is_empty()) {
            return Err(ExcludeError::Validation(
                "Module names must not be empty".to_string(),
            ));
        }

        if self.command.trim().is_empty() {
            return Err(ExcludeError::Validation(
                "No command provided".to_string(),
            ));
        }

        if !self.manifest_path.exists() {
            return Err(ExcludeError::Validation(format!(
                "Manifest not found: {}",
                self.manifest_path.display()
            )));
        }

        if self.temp_root.as_os_str().is_empty() {
            return Err(ExcludeError::Validation(
                "Temporary directory must not be empty".to_string(),
            ));
        }

        if normalize_path(&self.temp_root) == normalize_path(&self.module_dir) {
            return Err(ExcludeError::Validation(format!(
                "Temporary directory {} must differ from the module directory",
                self.temp_root.display()
            )));
        }

        Ok(())
    }
}
