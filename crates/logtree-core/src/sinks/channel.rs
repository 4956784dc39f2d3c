//! Sink that hands rendered lines to a Tokio writer task.

use super::{Sink, Threshold};
use crate::diagnostics;
use crate::format::{Formatter, Render};
use crate::record::Event;
use logtree_types::{Level, LogtreeError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tokio::task::{self, JoinHandle};

enum Command {
    Line(String),
    Flush(oneshot::Sender<()>),
}

/// Renders on the logging thread, writes on a background task.
///
/// Dispatch never waits for I/O: the threshold check and rendering happen
/// synchronously, the bytes are queued. [`Sink::flush`] blocks until
/// everything queued before it has been written, which is what a `FATAL`
/// event relies on before the process exits. Call [`AsyncSink::shutdown`]
/// to drain the queue and stop the writer task.
pub struct AsyncSink {
    level: Threshold,
    formatter: Arc<dyn Render>,
    tx: Mutex<Option<UnboundedSender<Command>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl AsyncSink {
    /// Start a writer task on the current Tokio runtime.
    pub fn spawn<W>(level: Level, writer: W) -> Result<Self>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let handle = Handle::try_current()
            .map_err(|e| LogtreeError::Sink(format!("Async sink needs a Tokio runtime: {}", e)))?;
        let (tx, rx) = mpsc::unbounded_channel();
        let task = handle.spawn(write_loop(writer, rx));

        Ok(Self {
            level: Threshold::new(level),
            formatter: Arc::new(Formatter::detailed()),
            tx: Mutex::new(Some(tx)),
            task: Mutex::new(Some(task)),
        })
    }

    /// Replace the renderer.
    pub fn with_formatter(mut self, formatter: impl Render + 'static) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    /// Stop accepting events and wait until everything queued is written.
    pub async fn shutdown(&self) -> Result<()> {
        drop(self.tx.lock().take());
        let task = self.task.lock().take();
        if let Some(task) = task {
            task.await
                .map_err(|e| LogtreeError::Sink(format!("Async writer task failed: {}", e)))?;
        }
        Ok(())
    }

    fn send(&self, command: Command) -> Result<()> {
        let tx = self.tx.lock();
        let tx = tx
            .as_ref()
            .ok_or_else(|| LogtreeError::Sink("Async sink is shut down".to_string()))?;
        tx.send(command)
            .map_err(|_| LogtreeError::Sink("Async writer task has stopped".to_string()))
    }
}

async fn write_loop<W>(mut writer: W, mut rx: UnboundedReceiver<Command>)
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    while let Some(command) = rx.recv().await {
        match command {
            Command::Line(line) => {
                if let Err(e) = writer.write_all(line.as_bytes()).await {
                    diagnostics::sink_failed("async", &LogtreeError::Io(e));
                }
            }
            Command::Flush(ack) => {
                if let Err(e) = writer.flush().await {
                    diagnostics::sink_failed("async", &LogtreeError::Io(e));
                }
                // The flusher may have given up waiting.
                let _ = ack.send(());
            }
        }
    }
    if let Err(e) = writer.flush().await {
        diagnostics::sink_failed("async", &LogtreeError::Io(e));
    }
}

impl Sink for AsyncSink {
    fn level(&self) -> Level {
        self.level.get()
    }

    fn set_level(&self, level: Level) {
        self.level.set(level);
    }

    fn emit(&self, event: &Event) -> Result<()> {
        let mut line = self.formatter.format(event);
        line.push('\n');
        self.send(Command::Line(line))
    }

    /// Wait until the writer task has written and flushed everything queued.
    ///
    /// Blocks the calling thread. Works from plain threads and from a
    /// multi-threaded runtime; a current-thread runtime cannot make progress
    /// while blocked, so there the flush is queued and an error returned.
    fn flush(&self) -> Result<()> {
        let (ack, done) = oneshot::channel();
        self.send(Command::Flush(ack))?;

        let drained = match Handle::try_current() {
            Err(_) => done.blocking_recv(),
            Ok(handle) => match handle.runtime_flavor() {
                RuntimeFlavor::MultiThread => task::block_in_place(|| handle.block_on(done)),
                _ => {
                    return Err(LogtreeError::Sink(
                        "Async sink cannot wait for its writer on a current-thread runtime; \
                         await shutdown() instead"
                            .to_string(),
                    ))
                }
            },
        };
        drained.map_err(|_| LogtreeError::Sink("Async writer task has stopped".to_string()))
    }
}
