#![deny(clippy::all)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

pub mod index;
pub mod naming;

pub use index::{parse_index, render_index, BinaryRecord, Index, INDEX_DIR, INDEX_FILE};
pub use naming::{package_name, EnvName};
