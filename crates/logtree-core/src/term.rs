//! Terminal utilities for coloured console output.

use colored::Colorize;
use logtree_types::{ColorMode, ConsoleStream, Level};
use std::io::{self, IsTerminal};

/// Check if the given standard stream is attached to a terminal.
pub fn in_controlling_terminal(stream: ConsoleStream) -> bool {
    match stream {
        ConsoleStream::Stdout => io::stdout().is_terminal(),
        ConsoleStream::Stderr => io::stderr().is_terminal(),
    }
}

/// Resolve a colour mode for a stream.
pub fn should_color(mode: ColorMode, stream: ConsoleStream) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => in_controlling_terminal(stream),
    }
}

/// Colour a rendered line according to its level.
pub fn paint(level: Level, line: &str) -> String {
    match level {
        Level::NotSet => line.to_string(),
        Level::Debug => line.dimmed().to_string(),
        Level::Info => line.green().to_string(),
        Level::Warn => line.yellow().to_string(),
        Level::Error => line.red().to_string(),
        Level::Fatal => line.red().bold().to_string(),
    }
}
