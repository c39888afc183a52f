use std::path::Path;

use anyhow::Result;
use installcon_domain::{package_name, BinaryRecord, EnvName, Index};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::core::conda::{CondaCli, CondaCommandError};
use crate::effects::FileSystem;
use crate::{conda_missing_outcome, CommandContext, ExecutionOutcome};

use super::index_store::{load_index, save_index};

#[derive(Clone, Debug)]
pub struct UninstallRequest {
    pub package: String,
}

/// Result of one uninstall step; steps never abort each other.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct StepReport {
    pub(crate) ok: bool,
    pub(crate) message: String,
}

impl StepReport {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }

    fn to_json(&self) -> Value {
        json!({ "ok": self.ok, "message": self.message })
    }
}

pub(crate) fn remove_environment_step(conda: &CondaCli<'_>, env: &EnvName) -> StepReport {
    info!(%env, "removing conda environment");
    match conda.remove_environment(env) {
        Ok(_) => StepReport::ok(format!("Removed environment {env}")),
        Err(err) => {
            let output = err
                .downcast_ref::<CondaCommandError>()
                .map_or_else(|| format!("{err:#}"), |failed| failed.output.clone());
            warn!(%env, "environment removal failed");
            StepReport::failed(format!("Unable to remove previous environment. \n\n{output}"))
        }
    }
}

/// Deletes each recorded wrapper, reporting every file on its own.
pub(crate) fn delete_wrappers_step(
    fs: &dyn FileSystem,
    records: &[BinaryRecord],
) -> Vec<StepReport> {
    records
        .iter()
        .map(|record| {
            let path = Path::new(&record.script_path);
            if !fs.is_file(path) {
                return StepReport::ok(format!(
                    "Wrapper script {} was already gone",
                    record.script_path
                ));
            }
            match fs.remove_file(path) {
                Ok(()) => StepReport::ok(format!("Deleted wrapper script {}", record.script_path)),
                Err(err) => StepReport::failed(format!(
                    "Unable to delete wrapper script {}: {err:#}",
                    record.script_path
                )),
            }
        })
        .collect()
}

pub(crate) fn delete_from_index_step(
    ctx: &CommandContext,
    index: &mut Index,
    env: &EnvName,
) -> StepReport {
    if index.remove(env).is_none() {
        return StepReport::failed(format!("{env} not found in index file."));
    }
    match save_index(ctx, index) {
        Ok(()) => StepReport::ok(format!("{env} deleted from index file.")),
        Err(err) => StepReport::failed(format!("Unable to update index file: {err:#}")),
    }
}

/// Removes a package's environment, its wrappers and its index entry.
///
/// # Errors
/// Returns an error only when the index exists but cannot be read.
pub fn uninstall_package(
    ctx: &CommandContext,
    request: &UninstallRequest,
) -> Result<ExecutionOutcome> {
    let package = package_name(&request.package);
    if package.is_empty() {
        return Ok(ExecutionOutcome::user_error(
            "a package name is required",
            json!({ "reason": "missing_package", "hint": "pass -p <package> with -u" }),
        ));
    }
    let Some(conda_exe) = ctx.config().conda().executable.clone() else {
        return Ok(conda_missing_outcome());
    };
    let env = EnvName::for_package(package);
    let conda = CondaCli::new(&conda_exe, ctx.runner(), &[]);

    let mut steps = vec![remove_environment_step(&conda, &env)];
    match load_index(ctx)? {
        Some(mut index) => {
            let records = index.get(&env).map(<[BinaryRecord]>::to_vec).unwrap_or_default();
            steps.extend(delete_wrappers_step(ctx.fs(), &records));
            steps.push(delete_from_index_step(ctx, &mut index, &env));
        }
        None => steps.push(StepReport::failed(crate::NO_INDEX_MESSAGE)),
    }

    let report = steps
        .iter()
        .map(|step| step.message.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    let details = json!({
        "env": env.as_str(),
        "package": package,
        "steps": steps.iter().map(StepReport::to_json).collect::<Vec<_>>(),
    });
    if steps.iter().all(|step| step.ok) {
        Ok(ExecutionOutcome::success(report, details))
    } else {
        Ok(ExecutionOutcome::failure(report, details))
    }
}
