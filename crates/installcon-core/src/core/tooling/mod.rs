//! CLI-facing outcome shaping and canned messages.

mod messages;
pub(crate) mod outcome;

pub use messages::{conda_missing_outcome, NO_INDEX_MESSAGE};
pub(crate) use messages::{no_writable_dir_outcome, NO_PACKAGES_MESSAGE};
