use crate::core::path::{config_file, default_temp_root, ensure_dir, MANIFEST_NAME, MODULES_DIR_NAME};
use crate::core::{ExcludeError, ExcludeResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// npm executable to run (looked up on PATH)
    #[serde(default = "default_npm_binary")]
    pub npm_binary: String,

    /// Arguments appended after the npm subcommand
    ///
    /// `-v` drops any `--loglevel <level>` pair from this list.
    #[serde(default = "default_npm_args")]
    pub npm_args: Vec<String>,

    /// Modules directory, relative to the working directory (defaults to ./node_modules)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_dir: Option<String>,

    /// Manifest path, relative to the working directory (defaults to ./package.json)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<String>,

    /// Staging directory (defaults to <os temp>/npmExclude)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tmp_dir: Option<String>,
}

fn default_npm_binary() -> String {
    "npm".to_string()
}

fn default_npm_args() -> Vec<String> {
    vec!["--loglevel".to_string(), "warn".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            npm_binary: default_npm_binary(),
            npm_args: default_npm_args(),
            module_dir: None,
            manifest: None,
            tmp_dir: None,
        }
    }
}

impl Config {
    /// Load config from platform-specific config directory, creating default if it doesn't exist
    ///
    /// Config locations:
    /// - Windows: %APPDATA%\npm-exclude\config.yaml
    /// - Linux: ~/.config/npm-exclude/config.yaml
    /// - macOS: ~/Library/Application Support/npm-exclude/config.yaml
    pub fn load() -> ExcludeResult<Self> {
        let config_path = config_file()?;

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = fs::read_to_string(&config_path)?;
        Self::from_yaml(&content)
    }

    /// Parse a config document; missing fields take their defaults
    pub fn from_yaml(content: &str) -> ExcludeResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| ExcludeError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save config to platform-specific config directory
    pub fn save(&self) -> ExcludeResult<()> {
        let config_path = config_file()?;
        let config_dir = config_path
            .parent()
            .ok_or_else(|| ExcludeError::Path("Invalid config path".to_string()))?;

        ensure_dir(config_dir)?;

        let content = serde_yaml::to_string(self)
            .map_err(|e| ExcludeError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)?;
        Ok(())
    }

    /// npm arguments, without `--loglevel <level>` when `verbose` is set
    pub fn npm_args_for(&self, verbose: bool) -> Vec<String> {
        if !verbose {
            return self.npm_args.clone();
        }

        let mut args = Vec::with_capacity(self.npm_args.len());
        let mut iter = self.npm_args.iter();
        while let Some(arg) = iter.next() {
            if arg == "--loglevel" {
                iter.next();
            } else if !arg.starts_with("--loglevel=") {
                args.push(arg.clone());
            }
        }
        args
    }

    pub fn get_module_dir(&self) -> PathBuf {
        self.module_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(MODULES_DIR_NAME))
    }

    pub fn get_manifest(&self) -> PathBuf {
        self.manifest
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(MANIFEST_NAME))
    }

    pub fn get_tmp_dir(&self) -> PathBuf {
        self.tmp_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_temp_root)
    }
}
