//! Log subscriber setup.
//!
//! Logs go to stderr so stdout stays clean for tables and JSON. `RUST_LOG`
//! sets the filter (default `warn`); `PRIVCAP_LOG_FORMAT=json` switches to
//! JSON lines.

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable selecting the log format.
pub(crate) const LOG_FORMAT_ENV: &str = "PRIVCAP_LOG_FORMAT";

/// Install the global tracing subscriber.
pub(crate) fn init_tracing(verbose: bool) {
    let log_format = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "text".to_string());
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
