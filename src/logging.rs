//! Diagnostic logging setup.

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a stderr subscriber filtered at `level`.
///
/// Calling this more than once keeps the first subscriber.
pub fn init(level: Level) {
    let result = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if result.is_err() {
        tracing::debug!("logging already initialised");
    }
}
