//! The on-disk record of installed wrapper scripts.

mod io;
mod types;

pub use io::{parse_index, render_index};
pub use types::{BinaryRecord, Index};

/// Directory under `$HOME` that holds the index.
pub const INDEX_DIR: &str = ".installcon";

/// File name of the index inside [`INDEX_DIR`].
pub const INDEX_FILE: &str = "index.json";
