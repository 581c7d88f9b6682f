//! Terminal output with four severities.
//!
//! `log` and `success` go to stdout, `warn` and `error` to stderr. Colors are
//! dropped when `NO_COLOR` is set.

use std::fmt::Display;

const RESET: &str = "\x1b[0m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";

/// Message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Log,
    Success,
    Warn,
    Error,
}

impl Severity {
    fn color(self) -> &'static str {
        match self {
            Severity::Log => RESET,
            Severity::Success => GREEN,
            Severity::Warn => YELLOW,
            Severity::Error => RED,
        }
    }

    fn plain_prefix(self) -> &'static str {
        match self {
            Severity::Log => "",
            Severity::Success => "OK: ",
            Severity::Warn => "Warning: ",
            Severity::Error => "Error: ",
        }
    }
}

/// Check if color output is enabled
fn use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

/// Renders one line for `severity`.
pub fn render(severity: Severity, message: &str, color: bool) -> String {
    if color {
        format!("{}{}{}", severity.color(), message, RESET)
    } else {
        format!("{}{}", severity.plain_prefix(), message)
    }
}

/// Process-wide console logger. Stateless apart from the color switch.
#[derive(Debug, Clone, Copy)]
pub struct Logger {
    color: bool,
}

impl Default for Logger {
    fn default() -> Self {
        Self::from_env()
    }
}

impl Logger {
    /// Colors unless `NO_COLOR` is set.
    pub fn from_env() -> Self {
        Self { color: use_color() }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn log(&self, message: impl Display) {
        println!("{}", render(Severity::Log, &message.to_string(), self.color));
    }

    pub fn success(&self, message: impl Display) {
        println!("{}", render(Severity::Success, &message.to_string(), self.color));
    }

    pub fn warn(&self, message: impl Display) {
        eprintln!("{}", render(Severity::Warn, &message.to_string(), self.color));
    }

    pub fn error(&self, message: impl Display) {
        eprintln!("{}", render(Severity::Error, &message.to_string(), self.color));
    }
}
