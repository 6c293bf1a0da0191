//! Structured logging setup using the `tracing` ecosystem.
//!
//! The middleware itself only emits `tracing` events. Hosts that do not
//! already install a subscriber can call [`init`] for either JSON output
//! (for production) or pretty-printed output (for TTY / local dev).
//! Format is auto-detected from the terminal by [`resolve_format`].

use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

#[must_use]
pub fn resolve_format(pretty: bool, json: bool) -> LogFormat {
    if json {
        LogFormat::Json
    } else if pretty || std::io::IsTerminal::is_terminal(&std::io::stdout()) {
        LogFormat::Pretty
    } else {
        LogFormat::Json
    }
}

/// Install a global subscriber. Panics if one is already set.
pub fn init(level: Level, format: LogFormat) {
    let filter = Targets::new().with_default(level);

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(false))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }
}
