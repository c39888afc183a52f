use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use installcon_domain::{package_name, BinaryRecord, EnvName};
use serde_json::json;
use tracing::{info, warn};

use crate::core::conda::{detect_python_version, list_executables, CondaCli, CondaCommandError};
use crate::core::tooling::no_writable_dir_outcome;
use crate::{conda_missing_outcome, CommandContext, ExecutionOutcome, InstallUserError};

use super::describe::{describe_program, NO_DESCRIPTION};
use super::index_store::{load_index, save_index};
use super::paths::select_bin_dir;
use super::remove::{delete_wrappers_step, remove_environment_step};
use super::wrapper::{write_wrapper, Activation, ShellProfile, WrapperScript};

#[derive(Clone, Debug)]
pub struct InstallRequest {
    pub package: String,
    /// Python `major.minor` for the environment; detected when absent.
    pub python: Option<String>,
    pub channels: Vec<String>,
    pub bin_dir: Option<PathBuf>,
    pub activation: Option<Activation>,
}

/// Installs a conda package into its own environment and wraps its programs.
///
/// # Errors
/// Returns an error when the index or wrapper directory cannot be written.
pub fn install_package(ctx: &CommandContext, request: &InstallRequest) -> Result<ExecutionOutcome> {
    match install_inner(ctx, request) {
        Ok(outcome) => Ok(outcome),
        Err(err) => match err.downcast::<InstallUserError>() {
            Ok(user) => Ok(user.into()),
            Err(other) => Err(other),
        },
    }
}

fn install_inner(ctx: &CommandContext, request: &InstallRequest) -> Result<ExecutionOutcome> {
    let spec = request.package.trim();
    let package = package_name(spec);
    if package.is_empty() {
        return Ok(ExecutionOutcome::user_error(
            "a package name is required",
            json!({ "reason": "missing_package", "hint": "pass -p <package>" }),
        ));
    }
    let Some(conda_exe) = ctx.config().conda().executable.clone() else {
        return Ok(conda_missing_outcome());
    };
    let conda = CondaCli::new(&conda_exe, ctx.runner(), &request.channels);
    let env = EnvName::for_package(spec);

    if let Err(err) = conda.search(spec) {
        let (command, output) = command_failure(&err);
        return Ok(ExecutionOutcome::user_error(
            format!(
                "Could not find package \"{spec}\" in your list of current channels. \
                 Check the name or add a channel with -c.\n\n{output}"
            ),
            json!({
                "reason": "package_not_found",
                "package": package,
                "spec": spec,
                "command": command,
                "output": output,
            }),
        ));
    }

    let python = match request
        .python
        .clone()
        .or_else(|| detect_python_version(ctx.runner()))
    {
        Some(version) => version,
        None => {
            return Ok(ExecutionOutcome::user_error(
                "could not detect a Python version",
                json!({
                    "reason": "python_version_unknown",
                    "hint": "pass the version explicitly, e.g. -v 3.11",
                }),
            ))
        }
    };

    let bin_dir = match request
        .bin_dir
        .clone()
        .or_else(|| ctx.config().wrappers().bin_dir.clone())
    {
        Some(dir) => {
            ctx.fs().create_dir_all(&dir)?;
            dir
        }
        None => match select_bin_dir(ctx.fs(), &ctx.config().wrappers().search_path) {
            Some(dir) => dir,
            None => {
                let searched: Vec<String> = ctx
                    .config()
                    .wrappers()
                    .search_path
                    .iter()
                    .map(|dir| dir.display().to_string())
                    .collect();
                return Ok(no_writable_dir_outcome(&searched));
            }
        },
    };
    info!(dir = %bin_dir.display(), "writing wrappers");

    let builds = match conda.package_builds(spec) {
        Ok(builds) => builds,
        Err(err) => return Ok(step_failure("Could not get information about the package.", &err)),
    };
    let Some(build) = builds.last() else {
        return Ok(ExecutionOutcome::user_error(
            format!("conda lists no builds for \"{package}\""),
            json!({ "reason": "no_builds", "package": package }),
        ));
    };
    info!(url = %build.url, "downloading package archive");
    let archive = ctx.fetcher().fetch(&build.url)?;
    let executables = list_executables(&archive)?;
    if executables.is_empty() {
        return Ok(ExecutionOutcome::user_error(
            format!("package \"{package}\" does not ship any executables"),
            json!({
                "reason": "no_executables",
                "package": package,
                "url": build.url,
            }),
        ));
    }

    let mut index = load_index(ctx)?.unwrap_or_default();
    let mut replaced = false;
    let existing = match conda.find_environment(&env) {
        Ok(existing) => existing,
        Err(err) => return Ok(step_failure(ENV_LISTING_FAILED, &err)),
    };
    if existing.is_some() {
        let report = remove_environment_step(&conda, &env);
        if !report.ok {
            return Ok(ExecutionOutcome::failure(
                report.message,
                json!({ "reason": "remove_failed", "env": env.as_str() }),
            ));
        }
        replaced = true;
    }
    if let Some(previous) = index.remove(&env) {
        for report in delete_wrappers_step(ctx.fs(), &previous) {
            if !report.ok {
                warn!(%env, "{}", report.message);
            }
        }
        save_index(ctx, &index)?;
        replaced = true;
    }

    let create = conda.create_args(&env, &python, spec);
    info!(
        command = %conda.command_line(&create),
        "creating conda environment, this may take a while"
    );
    if let Err(err) = conda.create_environment(&env, &python, spec) {
        return Ok(step_failure(
            "Could not create virtual environment with the given version/package combination.",
            &err,
        ));
    }

    let created = match conda.find_environment(&env) {
        Ok(created) => created,
        Err(err) => return Ok(step_failure(ENV_LISTING_FAILED, &err)),
    };
    let prefix = match created {
        Some(prefix) => prefix,
        None => ctx
            .config()
            .conda()
            .root_prefix
            .clone()
            .map(|root| root.join("envs").join(env.as_str()))
            .ok_or_else(|| {
                InstallUserError::new(
                    format!("could not locate the prefix of environment {env}"),
                    json!({ "reason": "env_prefix_unknown", "env": env.as_str() }),
                )
            })?,
    };

    let activation = request
        .activation
        .unwrap_or(ctx.config().wrappers().activation);
    let profile = ShellProfile::current();
    let mut records = Vec::with_capacity(executables.len());
    let mut missing = Vec::new();
    for name in &executables {
        let binary = prefix.join("bin").join(name);
        let present = ctx.fs().is_file(&binary);
        if !present {
            warn!(program = %name, path = %binary.display(), "program missing from environment");
            missing.push(name.clone());
        }
        let script = WrapperScript {
            name,
            binary: &binary,
            env: &env,
            prefix: &prefix,
            activation,
            profile,
        };
        let script_path = write_wrapper(ctx.fs(), &bin_dir, &script)?;
        let description = if present {
            describe_program(ctx.runner(), &script_path)
        } else {
            NO_DESCRIPTION.to_string()
        };
        records.push(BinaryRecord {
            name: name.clone(),
            script_path: script_path.display().to_string(),
            script_desc: description,
        });
    }
    index.insert(&env, records.clone());
    save_index(ctx, &index)?;

    let mut summary = format!("You have installed the following scripts for {env}:\n");
    for record in &records {
        let _ = write!(
            summary,
            "\n  Program: {}\n    Description: {}\n    Path: {}\n",
            record.name, record.script_desc, record.script_path
        );
    }
    if !missing.is_empty() {
        let _ = write!(
            summary,
            "\nWarning: these programs were not found in {} and their wrappers will fail:\n",
            prefix.join("bin").display()
        );
        for name in &missing {
            let _ = writeln!(summary, "  {name}");
        }
    }
    Ok(ExecutionOutcome::success(
        summary.trim_end().to_string(),
        json!({
            "env": env.as_str(),
            "package": package,
            "spec": spec,
            "python": python,
            "bin_dir": bin_dir,
            "activation": activation,
            "programs": records,
            "missing": missing,
            "replaced": replaced,
        }),
    ))
}

const ENV_LISTING_FAILED: &str = "Could not get information about installed environments.";

fn command_failure(err: &anyhow::Error) -> (Option<String>, String) {
    match err.downcast_ref::<CondaCommandError>() {
        Some(failed) => (Some(failed.command.clone()), failed.output.clone()),
        None => (None, format!("{err:#}")),
    }
}

fn step_failure(summary: &str, err: &anyhow::Error) -> ExecutionOutcome {
    let (command, output) = command_failure(err);
    ExecutionOutcome::failure(
        format!("{summary}\n\n{output}"),
        json!({ "command": command, "output": output }),
    )
}
