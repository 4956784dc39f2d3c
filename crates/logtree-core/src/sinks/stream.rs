//! Synchronous text sinks over standard streams, files, or any writer.

use super::{Sink, Threshold};
use crate::format::{Formatter, Render};
use crate::record::Event;
use crate::term;
use logtree_types::{Level, LogtreeError, Result};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

enum Target {
    Stdout,
    Stderr,
    File(PathBuf),
    Writer,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Stdout => write!(f, "stdout"),
            Target::Stderr => write!(f, "stderr"),
            Target::File(path) => write!(f, "{}", path.display()),
            Target::Writer => write!(f, "writer"),
        }
    }
}

/// Writes one rendered line per event.
pub struct StreamSink {
    level: Threshold,
    formatter: RwLock<Arc<dyn Render>>,
    writer: Mutex<Box<dyn Write + Send>>,
    target: Target,
    color: bool,
}

impl StreamSink {
    fn build(level: Level, writer: Box<dyn Write + Send>, target: Target) -> Self {
        Self {
            level: Threshold::new(level),
            formatter: RwLock::new(Arc::new(Formatter::detailed())),
            writer: Mutex::new(writer),
            target,
            color: false,
        }
    }

    /// Sink writing to standard error.
    pub fn stderr(level: Level) -> Self {
        Self::build(level, Box::new(io::stderr()), Target::Stderr)
    }

    /// Sink writing to standard output.
    pub fn stdout(level: Level) -> Self {
        Self::build(level, Box::new(io::stdout()), Target::Stdout)
    }

    /// Sink writing to an arbitrary writer.
    pub fn new(level: Level, writer: impl Write + Send + 'static) -> Self {
        Self::build(level, Box::new(writer), Target::Writer)
    }

    /// Sink appending to a file, created if missing.
    pub fn file(level: Level, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = open_append(&path)?;
        Ok(Self::build(level, Box::new(file), Target::File(path)))
    }

    /// Replace the renderer.
    pub fn with_formatter(self, formatter: impl Render + 'static) -> Self {
        *self.formatter.write() = Arc::new(formatter);
        self
    }

    /// Colour lines by level.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Swap the renderer on a live sink.
    pub fn set_formatter(&self, formatter: Arc<dyn Render>) {
        *self.formatter.write() = formatter;
    }

    /// Path of a file-backed sink.
    pub fn path(&self) -> Option<&Path> {
        match &self.target {
            Target::File(path) => Some(path),
            _ => None,
        }
    }

    /// Reopen the backing file, e.g. after an external tool rotated it.
    ///
    /// Not file-backed sinks are left untouched.
    pub fn reopen(&self) -> Result<()> {
        if let Target::File(path) = &self.target {
            let file = open_append(path)?;
            let mut writer = self.writer.lock();
            // Whatever the old handle still buffers belongs to the old file.
            let _ = writer.flush();
            *writer = Box::new(file);
        }
        Ok(())
    }
}

fn open_append(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| LogtreeError::Sink(format!("Failed to open {}: {}", path.display(), e)))
}

impl Sink for StreamSink {
    fn level(&self) -> Level {
        self.level.get()
    }

    fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    fn emit(&self, event: &Event) -> Result<()> {
        let rendered = self.formatter.read().format(event);
        let mut line = if self.color {
            term::paint(event.level(), &rendered)
        } else {
            rendered
        };
        line.push('\n');

        self.writer
            .lock()
            .write_all(line.as_bytes())
            .map_err(|e| LogtreeError::Sink(format!("Failed to write to {}: {}", self.target, e)))
    }

    fn flush(&self) -> Result<()> {
        self.writer
            .lock()
            .flush()
            .map_err(|e| LogtreeError::Sink(format!("Failed to flush {}: {}", self.target, e)))
    }
}

impl fmt::Debug for StreamSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSink")
            .field("level", &self.level.get())
            .field("target", &self.target.to_string())
            .field("color", &self.color)
            .finish()
    }
}
