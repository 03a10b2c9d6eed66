//! Relocate module directories between the modules directory and the staging root.
//!
//! A move is a rename when source and destination share a filesystem, and a
//! recursive copy followed by removal of the source otherwise. Destinations are
//! never overwritten.

use crate::core::{ExcludeError, ExcludeResult};
use crate::exclude::result::StagedDirectory;
use futures::future::join_all;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, error, warn};
use walkdir::WalkDir;

/// Result of one entry in a move batch
#[derive(Debug)]
pub enum MoveOutcome {
    /// The input was an absent sentinel
    Skipped,
    Moved(StagedDirectory),
    Failed(ExcludeError),
}

impl MoveOutcome {
    pub fn moved(&self) -> Option<&StagedDirectory> {
        match self {
            MoveOutcome::Moved(staged) => Some(staged),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ExcludeError> {
        match self {
            MoveOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Split a batch into what moved and every failure that occurred
pub fn split_outcomes(outcomes: Vec<MoveOutcome>) -> (Vec<StagedDirectory>, Vec<ExcludeError>) {
    let mut moved = Vec::new();
    let mut errors = Vec::new();
    for outcome in outcomes {
        match outcome {
            MoveOutcome::Moved(staged) => moved.push(staged),
            MoveOutcome::Failed(err) => errors.push(err),
            MoveOutcome::Skipped => {}
        }
    }
    (moved, errors)
}

/// Move every `Some` source to `dest_root/<basename>`, concurrently.
///
/// One outcome per input, in input order. A failed move does not stop its
/// siblings.
pub async fn move_all(sources: &[Option<PathBuf>], dest_root: &Path) -> Vec<MoveOutcome> {
    join_all(sources.iter().map(|source| async move {
        let Some(source) = source else {
            return MoveOutcome::Skipped;
        };

        let Some(staged) = StagedDirectory::plan(source, dest_root) else {
            return MoveOutcome::Failed(ExcludeError::Path(format!(
                "Cannot move {}: path has no directory name",
                source.display()
            )));
        };

        match move_dir(&staged.original_path, &staged.staged_path).await {
            Ok(()) => MoveOutcome::Moved(staged),
            Err(err) => {
                warn!("{}", err);
                MoveOutcome::Failed(err)
            }
        }
    }))
    .await
}

/// Move staged directories back to their original paths, concurrently.
pub async fn move_back(staged: &[StagedDirectory]) -> Vec<ExcludeResult<()>> {
    join_all(
        staged
            .iter()
            .map(|dir| move_dir(&dir.staged_path, &dir.original_path)),
    )
    .await
}

/// Move one directory to exactly `to`, creating `to`'s parents as needed.
pub async fn move_dir(from: &Path, to: &Path) -> ExcludeResult<()> {
    let fail = |source: io::Error| ExcludeError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if fs::symlink_metadata(to).await.is_ok() {
        return Err(fail(destination_exists()));
    }

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).await.map_err(fail)?;
    }

    match fs::rename(from, to).await {
        Ok(()) => {
            debug!("Moved {} to {}", from.display(), to.display());
            Ok(())
        }
        Err(e) if is_cross_device(&e) => {
            debug!(
                "{} and {} are on different filesystems, copying instead",
                from.display(),
                to.display()
            );
            let (src, dst) = (from.to_path_buf(), to.to_path_buf());
            tokio::task::spawn_blocking(move || copy_then_remove(&src, &dst))
                .await
                .map_err(|join_err| fail(io::Error::other(join_err)))?
                .map_err(fail)
        }
        Err(e) => Err(fail(e)),
    }
}

/// Blocking variant of [`move_dir`], for contexts that cannot await
pub fn move_dir_blocking(from: &Path, to: &Path) -> ExcludeResult<()> {
    let fail = |source: io::Error| ExcludeError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if std::fs::symlink_metadata(to).is_ok() {
        return Err(fail(destination_exists()));
    }

    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent).map_err(fail)?;
    }

    match std::fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device(&e) => copy_then_remove(from, to).map_err(fail),
        Err(e) => Err(fail(e)),
    }
}

fn destination_exists() -> io::Error {
    io::Error::new(io::ErrorKind::AlreadyExists, "destination already exists")
}

fn is_cross_device(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::CrossesDevices {
        return true;
    }

    // EXDEV / ERROR_NOT_SAME_DEVICE
    #[cfg(unix)]
    {
        err.raw_os_error() == Some(18)
    }
    #[cfg(windows)]
    {
        err.raw_os_error() == Some(17)
    }
    #[cfg(not(any(unix, windows)))]
    {
        false
    }
}

/// Copy `from` to `to`, then delete `from`. A partial copy is removed on failure.
fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    copy_then_remove_with(from, to, |path| std::fs::remove_dir_all(path))
}

/// If removing the source fails partway, the source is refilled from the copy
/// and the copy is dropped, so the directory stays whole at `from`. Only when
/// that refill also fails does the complete copy stay at `to`.
fn copy_then_remove_with<F>(from: &Path, to: &Path, remove_source: F) -> io::Result<()>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    if let Err(e) = copy_tree(from, to, false) {
        if let Err(cleanup) = std::fs::remove_dir_all(to) {
            warn!(
                "Failed to clean up partial copy at {}: {}",
                to.display(),
                cleanup
            );
        }
        return Err(e);
    }

    let Err(e) = remove_source(from) else {
        return Ok(());
    };

    warn!(
        "Failed to remove {} after copying it: {}; putting it back",
        from.display(),
        e
    );
    match copy_tree(to, from, true) {
        Ok(()) => {
            if let Err(cleanup) = std::fs::remove_dir_all(to) {
                warn!("Failed to remove copy at {}: {}", to.display(), cleanup);
            }
        }
        Err(refill) => error!(
            "Failed to put {} back ({}); the complete copy remains at {}",
            from.display(),
            refill,
            to.display()
        ),
    }
    Err(e)
}

/// Recreate the tree under `from` at `to`. With `skip_existing`, entries
/// already present at `to` are left as they are.
fn copy_tree(from: &Path, to: &Path, skip_existing: bool) -> io::Result<()> {
    for entry in WalkDir::new(from).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        let relative = entry
            .path()
            .strip_prefix(from)
            .map_err(io::Error::other)?;
        let target = to.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            std::fs::create_dir_all(&target)?;
        } else if skip_existing && std::fs::symlink_metadata(&target).is_ok() {
            continue;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> io::Result<()> {
    let points_to = std::fs::read_link(link)?;
    std::os::unix::fs::symlink(points_to, target)
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> io::Result<()> {
    std::fs::copy(link, target).map(|_| ())
}
