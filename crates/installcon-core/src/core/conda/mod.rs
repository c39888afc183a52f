//! Plumbing around the conda CLI and the package archives it serves.

pub(crate) mod archive;
pub(crate) mod client;
pub(crate) mod python;

pub(crate) use archive::list_executables;
pub(crate) use client::{CondaCli, CondaCommandError, PackageBuild};
pub(crate) use python::detect_python_version;
