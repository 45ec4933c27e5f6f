//! Tracing subscriber setup.
//!
//! # Priority (highest to lowest)
//! 1. `PERSCOM_LOG` (e.g. `perscom_core=debug,info`)
//! 2. `RUST_LOG`
//! 3. `info`

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const LOG_ENV: &str = "PERSCOM_LOG";
const DEFAULT_DIRECTIVE: &str = "info";

fn env_filter() -> EnvFilter {
    [LOG_ENV, "RUST_LOG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber. Call once, before loading the config.
pub fn init() {
    let stderr_is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(stderr_is_tty)
        .with_target(true);

    // ignore: a subscriber may already be installed (tests, embedding)
    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init();
}
