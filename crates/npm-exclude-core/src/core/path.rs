use crate::core::error::{ExcludeError, ExcludeResult};
use std::path::{Path, PathBuf};

/// Manifest file name npm reads in a project root
pub const MANIFEST_NAME: &str = "package.json";

/// Directory npm installs dependencies into
pub const MODULES_DIR_NAME: &str = "node_modules";

/// Name of the staging folder created under the OS temp directory
pub const TEMP_DIR_NAME: &str = "npmExclude";

/// Get the npm-exclude home directory
///
/// Platform-specific locations:
/// - Windows: %APPDATA%\npm-exclude
/// - Linux: ~/.config/npm-exclude
/// - macOS: ~/Library/Application Support/npm-exclude
pub fn exclude_home() -> ExcludeResult<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ExcludeError::Path("Could not determine config directory".to_string()))?;
    Ok(config_dir.join("npm-exclude"))
}

/// Get the config file path
///
/// Platform-specific locations:
/// - Windows: %APPDATA%\npm-exclude\config.yaml
/// - Linux: ~/.config/npm-exclude/config.yaml
/// - macOS: ~/Library/Application Support/npm-exclude/config.yaml
pub fn config_file() -> ExcludeResult<PathBuf> {
    Ok(exclude_home()?.join("config.yaml"))
}

/// Default staging root (`<os temp>/npmExclude`)
pub fn default_temp_root() -> PathBuf {
    std::env::temp_dir().join(TEMP_DIR_NAME)
}

/// Resolve `path` against `base` unless it is already absolute
pub fn resolve_against(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        normalize_path(&base.join(path))
    }
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> ExcludeResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Normalize a path lexically, dropping `.` segments and folding `..`
pub fn normalize_path(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
