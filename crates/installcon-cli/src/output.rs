use atty::Stream;
use color_eyre::Result;
use installcon_core::{CommandInfo, CommandStatus, ExecutionOutcome};
use serde_json::Value;

use crate::style::Style;

#[derive(Clone, Copy, Debug)]
pub struct OutputOptions {
    pub quiet: bool,
    pub json: bool,
    pub no_color: bool,
}

pub fn exit_code(status: &CommandStatus) -> i32 {
    match status {
        CommandStatus::Ok => 0,
        CommandStatus::UserError => 1,
        CommandStatus::Failure => 2,
    }
}

/// Prints the outcome and returns the process exit code.
pub fn emit_output(
    opts: &OutputOptions,
    info: CommandInfo,
    outcome: &ExecutionOutcome,
) -> Result<i32> {
    let code = exit_code(&outcome.status);
    if opts.json {
        let payload = installcon_core::to_json_response(info, outcome, code);
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(code);
    }

    let style = Style::new(opts.no_color, atty::is(Stream::Stdout));
    match outcome.status {
        CommandStatus::Ok => {
            if !opts.quiet {
                println!("{}", outcome.message);
            }
        }
        CommandStatus::UserError | CommandStatus::Failure => {
            let (headline, body) = split_headline(&outcome.message);
            let message = installcon_core::format_status_message(info, headline);
            println!("{}", style.status(&outcome.status, &message));
            if let Some(body) = body {
                println!();
                println!("{}", style.command_output(body));
            }
            let why = collect_why_bullets(&outcome.details);
            if !why.is_empty() {
                println!();
                println!("{}", style.heading("Why:"));
                for reason in why {
                    println!("{}", style.bullet(&reason));
                }
            }
            if let Some(hint) = hint_from_details(&outcome.details) {
                println!();
                println!("{}", style.hint(hint));
            }
        }
    }
    Ok(code)
}

/// First line of a message, plus whatever follows the blank line after it.
fn split_headline(message: &str) -> (&str, Option<&str>) {
    match message.split_once('\n') {
        Some((head, rest)) => {
            let rest = rest.trim();
            (head.trim_end(), (!rest.is_empty()).then_some(rest))
        }
        None => (message, None),
    }
}

fn hint_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("hint"))
        .and_then(Value::as_str)
}

fn collect_why_bullets(details: &Value) -> Vec<String> {
    let mut bullets = Vec::new();
    if let Some(reason) = details.get("reason").and_then(Value::as_str) {
        if let Some(display) = reason_display(reason) {
            push_unique(&mut bullets, display);
        }
    }
    if let Some(command) = details.get("command").and_then(Value::as_str) {
        push_unique(&mut bullets, format!("Command: {command}"));
    }
    if let Some(searched) = details.get("searched").and_then(Value::as_array) {
        let dirs: Vec<&str> = searched.iter().filter_map(Value::as_str).collect();
        if !dirs.is_empty() {
            push_unique(&mut bullets, format!("Searched: {}", dirs.join(", ")));
        }
    }
    bullets
}

fn push_unique(vec: &mut Vec<String>, text: impl Into<String>) {
    let entry = text.into();
    if entry.trim().is_empty() {
        return;
    }
    if !vec.iter().any(|existing| existing == &entry) {
        vec.push(entry);
    }
}

fn reason_display(code: &str) -> Option<&'static str> {
    match code {
        "conda_missing" => Some("No conda executable was found on PATH."),
        "package_not_found" => Some("conda search did not find the package."),
        "no_writable_path_dir" => Some("Every PATH entry is read-only or belongs to conda."),
        "python_version_unknown" => Some("Neither python3 nor python answered --version."),
        "no_executables" => Some("The package archive has nothing under bin/ or python-scripts/."),
        "unsupported_archive" => Some("`.conda` (zip) archives cannot be inspected."),
        "missing_operation" => Some("Pass --package to install or uninstall, or --index to list."),
        _ => None,
    }
}
