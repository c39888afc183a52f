use std::fmt::Write as _;

use anyhow::Result;
use serde_json::json;

use crate::core::tooling::NO_PACKAGES_MESSAGE;
use crate::{CommandContext, ExecutionOutcome, NO_INDEX_MESSAGE};

use super::index_store::load_index;

#[derive(Clone, Debug, Default)]
pub struct ListRequest;

/// Lists every installed package with its wrapped programs.
///
/// # Errors
/// Returns an error if the index exists but cannot be read or parsed.
pub fn list_index(ctx: &CommandContext, _request: ListRequest) -> Result<ExecutionOutcome> {
    let Some(index) = load_index(ctx)? else {
        return Ok(ExecutionOutcome::success(
            NO_INDEX_MESSAGE,
            json!({ "index": ctx.config().index().file(), "packages": [] }),
        ));
    };
    if index.is_empty() {
        return Ok(ExecutionOutcome::success(
            NO_PACKAGES_MESSAGE,
            json!({ "index": ctx.config().index().file(), "packages": [] }),
        ));
    }

    let mut rendered = String::new();
    let mut packages = Vec::with_capacity(index.len());
    for (env, records) in index.iter() {
        if !rendered.is_empty() {
            rendered.push('\n');
        }
        let _ = write!(rendered, "Package: {}", env.package());
        for record in records {
            let _ = write!(
                rendered,
                "\n  Program: {}\n    Description: {}\n    Path: {}",
                record.name, record.script_desc, record.script_path
            );
        }
        packages.push(json!({
            "package": env.package(),
            "env": env.as_str(),
            "programs": records,
        }));
    }
    Ok(ExecutionOutcome::success(
        rendered,
        json!({ "index": ctx.config().index().file(), "packages": packages }),
    ))
}
