//! Stage, execute, and always restore.
//!
//! A run snapshots the manifest, then moves the excluded module directories
//! to the staging root while it rewrites the manifest, runs the command once,
//! and puts both back. If the manifest cannot be read nothing is moved, but the
//! command still runs. Every failure after validation is collected into the
//! [`RunResult`] instead of being returned.

use crate::core::{ExcludeError, ExcludeResult};
use crate::exclude::interrupt::InterruptShield;
use crate::exclude::locator::locate;
use crate::exclude::manifest::{ManifestEditor, ManifestStaging};
use crate::exclude::mover::{move_all, move_back, move_dir_blocking, split_outcomes};
use crate::exclude::request::ExclusionRequest;
use crate::exclude::result::{ManifestSnapshot, RunResult, StagedDirectory};
use crate::exclude::runner::{CommandRunner, ProcessRunner};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Lifecycle of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    ArgsValidated,
    Staging,
    Executing,
    Restoring,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::ArgsValidated => "args-validated",
            RunState::Staging => "staging",
            RunState::Executing => "executing",
            RunState::Restoring => "restoring",
            RunState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Directory side of staging
#[derive(Debug, Default)]
struct DirectoryStaging {
    staged: Vec<StagedDirectory>,
    skipped: Vec<String>,
    errors: Vec<ExcludeError>,
}

/// Owns everything that was staged and puts it back.
///
/// [`StagingGuard::restore`] is the normal release path. If the guard is
/// dropped without it (a panic in the command runner, or the run future being
/// dropped), `Drop` restores synchronously.
#[derive(Debug, Default)]
pub struct StagingGuard {
    snapshot: Option<ManifestSnapshot>,
    staged: Vec<StagedDirectory>,
}

impl StagingGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track_manifest(&mut self, snapshot: ManifestSnapshot) {
        self.snapshot = Some(snapshot);
    }

    pub fn track_directories(&mut self, staged: impl IntoIterator<Item = StagedDirectory>) {
        self.staged.extend(staged);
    }

    pub fn staged(&self) -> &[StagedDirectory] {
        &self.staged
    }

    pub fn has_manifest(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Write the manifest back and move every directory home, concurrently.
    ///
    /// Both halves are always attempted; every failure is returned.
    pub async fn restore(mut self) -> Vec<ExcludeError> {
        let snapshot = self.snapshot.take();
        let staged = std::mem::take(&mut self.staged);

        let restore_manifest = async {
            match snapshot {
                Some(snapshot) => {
                    info!("Restoring the original {}.", snapshot.path().display());
                    let result = ManifestEditor::restore(&snapshot).await;
                    if result.is_ok() {
                        info!("{} has been restored.", snapshot.path().display());
                    }
                    result
                }
                None => Ok(()),
            }
        };

        let restore_directories = async {
            if staged.is_empty() {
                return Vec::new();
            }
            info!("Moving the module folders back to the module directory.");
            move_back(&staged).await
        };

        let (manifest_result, directory_results) =
            tokio::join!(restore_manifest, restore_directories);

        let mut errors = Vec::new();
        if let Err(err) = manifest_result {
            errors.push(ExcludeError::restore(err));
        }
        errors.extend(
            directory_results
                .into_iter()
                .filter_map(Result::err)
                .map(ExcludeError::restore),
        );
        for err in &errors {
            error!("{}", err);
        }
        errors
    }
}

impl Drop for StagingGuard {
    fn drop(&mut self) {
        if self.snapshot.is_none() && self.staged.is_empty() {
            return;
        }

        warn!("Run ended before restore; restoring synchronously");
        if let Some(snapshot) = self.snapshot.take() {
            if let Err(e) = std::fs::write(snapshot.path(), snapshot.content()) {
                error!(
                    "Failed to restore {}: {}",
                    snapshot.path().display(),
                    e
                );
            }
        }
        for dir in self.staged.drain(..) {
            if let Err(e) = move_dir_blocking(&dir.staged_path, &dir.original_path) {
                error!("{}", e);
            }
        }
    }
}

/// Runs the stage / execute / restore cycle
pub struct StagingCoordinator {
    runner: Arc<dyn CommandRunner>,
}

impl Default for StagingCoordinator {
    fn default() -> Self {
        Self::new(Arc::new(ProcessRunner::new()))
    }
}

impl StagingCoordinator {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// Execute one run.
    ///
    /// Returns `Err` only for an invalid request, in which case nothing was
    /// touched. Otherwise the run always reaches restore and the outcome is
    /// described by the returned [`RunResult`].
    pub async fn run(&self, request: &ExclusionRequest) -> ExcludeResult<RunResult> {
        let mut state = RunState::Idle;
        debug!("npm-exclude run: {}", state);

        request.validate()?;
        state = advance(state, RunState::ArgsValidated);

        state = advance(state, RunState::Staging);
        let _shield = InterruptShield::install();
        let (directories, manifest) = match ManifestEditor::read(request.manifest_path()).await {
            Ok(snapshot) => tokio::join!(
                stage_directories(request),
                ManifestEditor::edit(snapshot, request.excluded()),
            ),
            Err(err) => {
                warn!("{}; leaving the module directories in place", err);
                (
                    DirectoryStaging::default(),
                    ManifestStaging {
                        snapshot: None,
                        error: Some(err),
                    },
                )
            }
        };

        let mut guard = StagingGuard::new();
        guard.track_directories(directories.staged);
        let ManifestStaging {
            snapshot,
            error: manifest_error,
        } = manifest;
        if let Some(snapshot) = snapshot {
            guard.track_manifest(snapshot);
        }

        let mut result = RunResult {
            staged: guard.staged().to_vec(),
            skipped: directories.skipped,
            staging_errors: directories.errors,
            ..Default::default()
        };
        result.staging_errors.extend(manifest_error);
        if !result.staging_errors.is_empty() {
            warn!(
                "Staging finished with {} error(s); running the command anyway",
                result.staging_errors.len()
            );
        }

        state = advance(state, RunState::Executing);
        info!("Preparing to execute the command.");
        let outcome = self
            .runner
            .run(request.cwd(), request.command(), request.command_args())
            .await;
        info!("The command has been executed.");
        result.command_succeeded = outcome.success;
        result.exit_code = outcome.exit_code;

        state = advance(state, RunState::Restoring);
        result.restore_errors = guard.restore().await;

        advance(state, RunState::Done);
        if result.is_success() {
            info!("npm-exclude has successfully executed.");
        }
        Ok(result)
    }
}

fn advance(from: RunState, to: RunState) -> RunState {
    debug!("npm-exclude run: {} -> {}", from, to);
    to
}

/// Locate the excluded modules and move those that exist to the staging root
async fn stage_directories(request: &ExclusionRequest) -> DirectoryStaging {
    let resolved = locate(request.module_dir(), request.excluded()).await;
    info!("Retrieved the module directories.");

    let mut skipped = Vec::new();
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let sources: Vec<Option<PathBuf>> = resolved
        .into_iter()
        .map(|dir| {
            if !dir.exists {
                skipped.push(dir.name);
                None
            } else if seen.insert(dir.original_path.clone()) {
                Some(dir.original_path)
            } else {
                // Duplicate name, already queued
                None
            }
        })
        .collect();

    let (staged, errors) = split_outcomes(move_all(&sources, request.temp_root()).await);
    if !staged.is_empty() {
        info!("The module directories have been moved.");
    }

    DirectoryStaging {
        staged,
        skipped,
        errors,
    }
}
