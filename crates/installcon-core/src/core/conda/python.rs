use tracing::debug;

use crate::effects::CommandRunner;

const INTERPRETERS: [&str; 2] = ["python3", "python"];

/// Major.minor of the first Python interpreter found on `PATH`.
pub(crate) fn detect_python_version(runner: &dyn CommandRunner) -> Option<String> {
    for interpreter in INTERPRETERS {
        match runner.run(interpreter, &["--version".to_string()]) {
            Ok(output) if output.success() => {
                // Python 2 printed its version to stderr.
                let text = format!("{} {}", output.stdout, output.stderr);
                if let Some(version) = parse_python_version(&text) {
                    debug!(%interpreter, %version, "detected python version");
                    return Some(version);
                }
            }
            Ok(output) => debug!(%interpreter, code = output.code, "python version check failed"),
            Err(err) => debug!(%interpreter, %err, "python version check failed"),
        }
    }
    None
}

pub(crate) fn parse_python_version(text: &str) -> Option<String> {
    let raw = text
        .split_whitespace()
        .skip_while(|word| !word.eq_ignore_ascii_case("python"))
        .nth(1)?;
    let mut parts = raw.split('.');
    let major = parts.next()?.parse::<u32>().ok()?;
    let minor = parts
        .next()?
        .chars()
        .take_while(char::is_ascii_digit)
        .collect::<String>()
        .parse::<u32>()
        .ok()?;
    Some(format!("{major}.{minor}"))
}
