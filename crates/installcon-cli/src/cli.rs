use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use installcon_core::Activation;

pub const INSTALLCON_ABOUT: &str =
    "Install the programs shipped by a conda package into their own environment \
     and put wrapper scripts for them on your PATH.";

pub const INSTALLCON_AFTER_HELP: &str = concat!(
    "Examples:\n",
    "  installcon -p libcomcat -v 3.9     install libcomcat's programs\n",
    "  installcon -p amptools -c conda-forge\n",
    "  installcon -i                      list installed programs\n",
    "  installcon -p libcomcat -u         uninstall libcomcat\n",
);

#[derive(Parser, Debug)]
#[command(
    name = "installcon",
    about = INSTALLCON_ABOUT,
    after_help = INSTALLCON_AFTER_HELP,
    disable_version_flag = true
)]
#[allow(clippy::struct_excessive_bools)]
pub struct InstallconCli {
    #[arg(
        short = 'p',
        long,
        value_name = "NAME",
        help = "Conda package available in your conda channels"
    )]
    pub package: Option<String>,
    #[arg(
        short = 'v',
        long = "version",
        value_name = "X.Y",
        help = "Python version for the package's environment (defaults to the python on PATH)"
    )]
    pub python: Option<String>,
    #[arg(
        short = 'i',
        long,
        help = "List installed programs grouped by package"
    )]
    pub index: bool,
    #[arg(short = 'u', long, help = "Uninstall the programs of --package")]
    pub uninstall: bool,
    #[arg(
        short = 'c',
        long = "channel",
        value_name = "CHANNEL",
        help = "Extra conda channel to search (repeatable)"
    )]
    pub channels: Vec<String>,
    #[arg(
        long,
        value_name = "DIR",
        help = "Write wrappers here instead of the first writable PATH directory [env: INSTALLCON_BIN_DIR]"
    )]
    pub bin_dir: Option<PathBuf>,
    #[arg(
        long,
        value_enum,
        help = "How wrappers enter the environment [default: direct, or INSTALLCON_ACTIVATION]"
    )]
    pub activation: Option<ActivationArg>,
    #[arg(short, long, help = "Suppress human output")]
    pub quiet: bool,
    #[arg(long, action = ArgAction::Count, help = "Increase logging (repeat for trace)")]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of --verbose/-q")]
    pub trace: bool,
    #[arg(long, help = "Emit {status,message,details} JSON envelopes")]
    pub json: bool,
    #[arg(long, help = "Disable colored human output")]
    pub no_color: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActivationArg {
    /// Export the environment prefix and exec the program directly
    Direct,
    /// Source ~/.bashrc (~/.bash_profile on macOS) and `conda activate`
    Profile,
}

impl From<ActivationArg> for Activation {
    fn from(value: ActivationArg) -> Self {
        match value {
            ActivationArg::Direct => Activation::Direct,
            ActivationArg::Profile => Activation::Profile,
        }
    }
}
