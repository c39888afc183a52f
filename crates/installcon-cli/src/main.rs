use std::sync::Arc;

use clap::Parser;
use color_eyre::Result;
use installcon_core::{
    install_package, list_index, uninstall_package, CommandContext, CommandGroup, CommandInfo,
    ExecutionOutcome, InstallRequest, ListRequest, SharedEffects, SystemEffects, UninstallRequest,
};
use serde_json::json;

mod cli;
mod output;
mod style;

use cli::InstallconCli;
use output::{emit_output, OutputOptions};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = InstallconCli::parse();
    init_tracing(&cli);

    let (info, outcome) = dispatch(&cli);
    let opts = OutputOptions {
        quiet: cli.quiet,
        json: cli.json,
        no_color: cli.no_color,
    };
    let code = emit_output(&opts, info, &outcome)?;

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn init_tracing(cli: &InstallconCli) {
    let level = if cli.trace || cli.verbose >= 2 {
        "trace"
    } else if cli.verbose == 1 {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };

    let filter = format!("installcon_core={level},installcon={level}");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

enum Operation {
    List,
    Install(InstallRequest),
    Uninstall(UninstallRequest),
}

impl Operation {
    fn info(&self) -> CommandInfo {
        match self {
            Operation::List => CommandInfo::new(CommandGroup::Index, "index"),
            Operation::Install(_) => CommandInfo::new(CommandGroup::Install, "install"),
            Operation::Uninstall(_) => CommandInfo::new(CommandGroup::Uninstall, "uninstall"),
        }
    }
}

fn select_operation(cli: &InstallconCli) -> Option<Operation> {
    if cli.index {
        return Some(Operation::List);
    }
    let package = cli.package.clone()?;
    if cli.uninstall {
        Some(Operation::Uninstall(UninstallRequest { package }))
    } else {
        Some(Operation::Install(InstallRequest {
            package,
            python: cli.python.clone(),
            channels: cli.channels.clone(),
            bin_dir: cli.bin_dir.clone(),
            activation: cli.activation.map(Into::into),
        }))
    }
}

fn dispatch(cli: &InstallconCli) -> (CommandInfo, ExecutionOutcome) {
    let Some(operation) = select_operation(cli) else {
        let info = CommandInfo::new(CommandGroup::Install, "install");
        let outcome = ExecutionOutcome::user_error(
            "nothing to do",
            json!({
                "reason": "missing_operation",
                "hint": "run `installcon -p <package>` to install or `installcon -i` to list",
            }),
        );
        return (info, outcome);
    };
    let info = operation.info();
    let effects: SharedEffects = Arc::new(SystemEffects::new());
    let result = CommandContext::new(effects).and_then(|ctx| match &operation {
        Operation::List => list_index(&ctx, ListRequest),
        Operation::Install(request) => install_package(&ctx, request),
        Operation::Uninstall(request) => uninstall_package(&ctx, request),
    });
    let outcome = result.unwrap_or_else(|err| {
        tracing::debug!(error = ?err, "command failed");
        ExecutionOutcome::failure(
            format!("{err:#}"),
            json!({ "reason": "internal_error" }),
        )
    });
    (info, outcome)
}
