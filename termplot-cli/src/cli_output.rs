// ABOUTME: User-facing diagnostics printed to stderr
// ABOUTME: Colored error and help lines when stderr is a terminal, plain text otherwise

use owo_colors::OwoColorize;
use std::io::IsTerminal;

/// Diagnostics never go to stdout, which carries the image frames.
pub struct CliOutput {
    use_color: bool,
}

impl CliOutput {
    /// Create new CLI output utility with TTY detection
    pub fn new() -> Self {
        Self {
            use_color: std::io::stderr().is_terminal(),
        }
    }

    pub fn with_color(use_color: bool) -> Self {
        Self { use_color }
    }

    pub fn use_color(&self) -> bool {
        self.use_color
    }

    pub fn error(&self, message: &str) {
        eprintln!("{}", self.format_error(message));
    }

    /// Display an error followed by an indented hint
    pub fn error_with_help(&self, message: &str, help: Option<&str>) {
        self.error(message);
        if let Some(help) = help {
            eprintln!("{}", self.format_help(help));
        }
    }

    pub fn format_error(&self, message: &str) -> String {
        if self.use_color {
            format!("{} {}", "error:".red().bold(), message)
        } else {
            format!("error: {}", message)
        }
    }

    fn format_help(&self, help: &str) -> String {
        if self.use_color {
            format!("  {} {}", "help:".dimmed(), help)
        } else {
            format!("  help: {}", help)
        }
    }
}

impl Default for CliOutput {
    fn default() -> Self {
        Self::new()
    }
}
