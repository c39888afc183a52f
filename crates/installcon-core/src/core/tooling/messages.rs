use serde_json::json;

use crate::ExecutionOutcome;

pub const NO_INDEX_MESSAGE: &str = "No index file exists.";

pub(crate) const NO_PACKAGES_MESSAGE: &str = "No packages installed.";

#[must_use]
pub fn conda_missing_outcome() -> ExecutionOutcome {
    ExecutionOutcome::user_error(
        "Conda does not seem to be in your path. Install it and then re-install this program.",
        json!({
            "reason": "conda_missing",
            "hint": "install conda (or set INSTALLCON_CONDA to a conda-compatible executable)",
        }),
    )
}

pub(crate) fn no_writable_dir_outcome(searched: &[String]) -> ExecutionOutcome {
    ExecutionOutcome::user_error(
        "Could not find any directories in path we can write to.",
        json!({
            "reason": "no_writable_path_dir",
            "searched": searched,
            "hint": "add a writable directory such as ~/bin to PATH, or pass --bin-dir",
        }),
    )
}
