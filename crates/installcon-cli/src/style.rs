use std::env;

use color_eyre::owo_colors::OwoColorize;
use installcon_core::CommandStatus;

/// Terminal styling for error reports; every method degrades to plain text.
pub struct Style {
    enabled: bool,
}

impl Style {
    pub fn new(force_no_color: bool, is_tty: bool) -> Self {
        let env_no_color = env::var_os("NO_COLOR").is_some();
        Self {
            enabled: !(force_no_color || env_no_color) && is_tty,
        }
    }

    /// `✗ installcon install: ...` headline, coloured by severity.
    pub fn status(&self, status: &CommandStatus, text: &str) -> String {
        let symbol = match status {
            CommandStatus::Ok => "✔",
            CommandStatus::UserError => "✗",
            CommandStatus::Failure => "✖",
        };
        let line = format!("{symbol} {text}");
        if !self.enabled {
            return line;
        }
        match status {
            CommandStatus::Ok => line.green().bold().to_string(),
            CommandStatus::UserError => line.yellow().bold().to_string(),
            CommandStatus::Failure => line.red().bold().to_string(),
        }
    }

    /// Output captured from conda, shown under the headline.
    pub fn command_output(&self, body: &str) -> String {
        if !self.enabled {
            return body.to_string();
        }
        body.lines()
            .map(|line| line.dimmed().to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn heading(&self, text: &str) -> String {
        if !self.enabled {
            return text.to_string();
        }
        text.bold().to_string()
    }

    pub fn bullet(&self, text: &str) -> String {
        if !self.enabled {
            return format!("  • {text}");
        }
        format!("  {} {text}", "•".cyan())
    }

    pub fn hint(&self, text: &str) -> String {
        if !self.enabled {
            return format!("Hint: {text}");
        }
        format!("{} {text}", "Hint:".cyan().bold())
    }
}
