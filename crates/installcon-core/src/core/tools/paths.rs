use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::effects::FileSystem;

/// Directories that belong to a conda installation are never used for
/// wrappers: activating or removing an environment would shadow or delete them.
pub(crate) fn looks_like_conda_dir(path: &Path) -> bool {
    path.components().any(|component| {
        matches!(component, Component::Normal(name) if name == "envs" || name == "condabin")
    })
}

/// First writable, non-conda directory on the search path.
pub(crate) fn select_bin_dir(fs: &dyn FileSystem, search_path: &[PathBuf]) -> Option<PathBuf> {
    for dir in search_path {
        if !dir.is_absolute() {
            debug!(dir = %dir.display(), "skipping relative PATH entry");
            continue;
        }
        if looks_like_conda_dir(dir) {
            debug!(dir = %dir.display(), "skipping conda-managed PATH entry");
            continue;
        }
        if fs.is_writable_dir(dir) {
            return Some(dir.clone());
        }
        debug!(dir = %dir.display(), "PATH entry is not writable");
    }
    None
}
