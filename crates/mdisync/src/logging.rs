//! Tracing subscriber setup.
//!
//! Library code logs through the `log` facade; `LogTracer` forwards those
//! records into the tracing subscriber installed here.

use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

/// Output format for log lines on stderr.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Installs the global subscriber. Respects `RUST_LOG`, defaulting to
/// `info`.
///
/// Returns `false` when a subscriber was already installed; a second call
/// leaves the first one in place.
pub fn init_logging(format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (text, json) = match format {
        LogFormat::Text => (
            Some(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            ),
            None,
        ),
        LogFormat::Json => (None, Some(fmt::layer().json().with_writer(std::io::stderr))),
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(text)
        .with(json);
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }

    // Another logger may own the `log` facade (e.g. in tests).
    let _ = tracing_log::LogTracer::init();
    true
}
