use std::path::Path;

use tracing::debug;

use crate::effects::CommandRunner;

pub(crate) const NO_DESCRIPTION: &str = "No description available.";

/// Runs `<script> --help` and keeps its first descriptive paragraph.
pub(crate) fn describe_program(runner: &dyn CommandRunner, script: &Path) -> String {
    let program = script.display().to_string();
    match runner.run(&program, &["--help".to_string()]) {
        Ok(output) => first_paragraph(&output.stdout)
            .or_else(|| {
                if exec_failed(output.code) {
                    debug!(%program, code = output.code, "wrapped program could not be executed");
                    None
                } else {
                    first_paragraph(&output.stderr)
                }
            })
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        Err(err) => {
            debug!(%program, %err, "help run failed");
            NO_DESCRIPTION.to_string()
        }
    }
}

/// First blank-line separated paragraph that is not a `usage:` line, with
/// its lines joined by single spaces.
pub(crate) fn first_paragraph(text: &str) -> Option<String> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    let mut iter = paragraphs.into_iter().peekable();
    if iter.peek().is_some_and(|first| is_usage(first[0])) {
        iter.next();
    }
    iter.next().map(|lines| lines.join(" "))
}

/// Statuses the shell reports when the exec target is missing or not runnable.
fn exec_failed(code: i32) -> bool {
    matches!(code, 126 | 127)
}

fn is_usage(line: &str) -> bool {
    line.get(..6)
        .is_some_and(|head| head.eq_ignore_ascii_case("usage:"))
}
