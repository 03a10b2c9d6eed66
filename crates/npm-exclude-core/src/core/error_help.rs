use crate::core::error::ExcludeError;

/// Short, actionable hints attached to errors shown to the user
pub trait ErrorHelp {
    fn help(&self) -> Option<String>;
}

impl ErrorHelp for ExcludeError {
    fn help(&self) -> Option<String> {
        match self {
            ExcludeError::Validation(_) => Some(
                "Run 'npm-exclude --help' to see the accepted arguments.".to_string(),
            ),
            ExcludeError::Config(_) | ExcludeError::Yaml(_) => Some(
                "Check the npm-exclude config.yaml file, or delete it to regenerate defaults."
                    .to_string(),
            ),
            ExcludeError::ManifestRead { .. } => {
                Some("Make sure package.json exists and is readable.".to_string())
            }
            ExcludeError::ManifestParse { .. } => {
                Some("package.json is not valid JSON; it was left untouched.".to_string())
            }
            ExcludeError::Move { from, .. } => Some(format!(
                "Check permissions on {} and that the temp directory is writable.",
                from.display()
            )),
            ExcludeError::Restore(inner) => Some(match inner.as_ref() {
                ExcludeError::Move { from, to, .. } => format!(
                    "Your project may be inconsistent: move {} back to {} by hand.",
                    from.display(),
                    to.display()
                ),
                ExcludeError::ManifestWrite { path, .. } => format!(
                    "Your project may be inconsistent: {} could not be restored.",
                    path.display()
                ),
                _ => "Your project may be inconsistent; inspect it before running npm again."
                    .to_string(),
            }),
            _ => None,
        }
    }
}

/// Render an error with its hint (if any) on the following line
pub fn format_error_with_help(err: &ExcludeError) -> String {
    match err.help() {
        Some(help) => format!("Error: {}\n  help: {}", err, help),
        None => format!("Error: {}", err),
    }
}
