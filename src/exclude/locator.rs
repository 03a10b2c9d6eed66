//! Resolve requested module names to directories under the modules directory.

use crate::exclude::result::ResolvedDirectory;
use futures::future::join_all;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Look up `base/<name>` for every requested name, preserving input order.
///
/// Absence is expected: a missing, non-directory or unreadable candidate is
/// reported with `exists == false` instead of an error. Symlinks are never
/// treated as module directories.
pub async fn locate(base: &Path, names: &[String]) -> Vec<ResolvedDirectory> {
    join_all(names.iter().map(|name| locate_one(base, name))).await
}

async fn locate_one(base: &Path, name: &str) -> ResolvedDirectory {
    let original_path = candidate_path(base, name);

    let exists = match &original_path {
        Some(path) => match tokio::fs::symlink_metadata(path).await {
            Ok(metadata) => metadata.is_dir(),
            Err(e) => {
                debug!(
                    "Could not find the {} module directory. Searched for {} ({})",
                    name,
                    path.display(),
                    e
                );
                false
            }
        },
        None => {
            debug!("Ignoring module name {:?}: not a plain package name", name);
            false
        }
    };

    ResolvedDirectory {
        name: name.to_string(),
        original_path: original_path.unwrap_or_else(|| base.join(name)),
        exists,
    }
}

/// `base/name`, or `None` when `name` could escape `base`
fn candidate_path(base: &Path, name: &str) -> Option<PathBuf> {
    if name.is_empty() {
        return None;
    }

    let relative = Path::new(name);
    if !relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)))
    {
        return None;
    }

    Some(base.join(relative))
}
