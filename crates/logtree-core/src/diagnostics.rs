//! Diagnostics about logtree itself.
//!
//! Sink failures and the optional no-handler advisory are reported here,
//! never to the caller of an emission method. They go through `tracing`
//! at target `logtree` when a subscriber is installed, otherwise straight
//! to standard error.

use logtree_types::{LogtreeError, Result};
use tracing::subscriber::NoSubscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the diagnostics filter directive.
pub const FILTER_ENV: &str = "LOGTREE_LOG";

/// Install a `tracing` subscriber that prints logtree diagnostics to stderr.
///
/// The filter comes from `LOGTREE_LOG`, defaulting to `logtree=warn`.
/// Fails if another global subscriber is already installed.
pub fn init_default() -> Result<()> {
    let filter = EnvFilter::try_from_env(FILTER_ENV)
        .unwrap_or_else(|_| EnvFilter::new("logtree=warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .try_init()
        .map_err(|e| {
            LogtreeError::Other(format!("Failed to install diagnostics subscriber: {}", e))
        })
}

// Any subscriber counts, global or scoped to the current thread.
fn subscriber_active() -> bool {
    tracing::dispatcher::get_default(|dispatch| !dispatch.is::<NoSubscriber>())
}

fn report(message: String) {
    if subscriber_active() {
        tracing::warn!(target: "logtree", "{}", message);
    } else {
        eprintln!("logtree: {}", message);
    }
}

/// A sink returned an error while handling an event.
pub(crate) fn sink_failed(logger: &str, err: &LogtreeError) {
    report(format!("sink on logger '{}' failed: {}", logger, err));
}

/// A sink panicked while handling an event.
pub(crate) fn sink_panicked(logger: &str) {
    report(format!("sink on logger '{}' panicked; continuing with remaining sinks", logger));
}

/// An admitted event reached no sink anywhere on its path.
pub(crate) fn no_handler(logger: &str) {
    report(format!("no handler found for logger '{}'", logger));
}
