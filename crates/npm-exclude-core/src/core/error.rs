use std::path::PathBuf;
use thiserror::Error;

pub type ExcludeResult<T> = Result<T, ExcludeError>;

#[derive(Error, Debug)]
pub enum ExcludeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Path error: {0}")]
    Path(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// Bad or missing invocation arguments. Raised before anything is staged.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// One directory could not be relocated.
    #[error("Failed to move {} to {}: {source}", .from.display(), .to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read manifest {}: {source}", .path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write manifest {}: {source}", .path.display())]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest {}: {source}", .path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A staged resource could not be put back.
    #[error("Restore failed: {0}")]
    Restore(Box<ExcludeError>),

    /// A subprocess exited with a non-zero status code.
    /// The exit code should be propagated to the shell.
    #[error("Command exited with code {0}")]
    SubprocessExit(i32),
}

impl ExcludeError {
    /// Wrap an error raised while putting a staged resource back.
    pub fn restore(err: ExcludeError) -> Self {
        match err {
            already @ ExcludeError::Restore(_) => already,
            other => ExcludeError::Restore(Box::new(other)),
        }
    }
}
