#![deny(clippy::all)]

mod core;

pub(crate) use crate::core::config;
pub(crate) use crate::core::runtime::{effects, process};

pub use crate::core::config::context::{CommandContext, CommandInfo};
pub use crate::core::config::Config;
pub use crate::core::runtime::effects::{
    ArchiveFetcher, CommandRunner, Effects, FileSystem, SharedEffects, SystemEffects,
};
pub use crate::core::runtime::process::RunOutput;
pub use crate::core::runtime::{format_status_message, to_json_response, CommandGroup};
pub use crate::core::tooling::outcome::{CommandStatus, ExecutionOutcome, InstallUserError};
pub use crate::core::tooling::{conda_missing_outcome, NO_INDEX_MESSAGE};

pub use crate::core::tools::{
    install_package, list_index, uninstall_package, Activation, InstallRequest, ListRequest,
    UninstallRequest,
};

pub const INSTALLCON_VERSION: &str = env!("CARGO_PKG_VERSION");
