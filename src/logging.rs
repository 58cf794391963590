//! Tracing setup for the `tnea` binary.

use std::sync::Once;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Environment variable holding an `EnvFilter` directive string.
pub const LOG_ENV: &str = "TNEA_LOG";

static INIT: Once = Once::new();

/// Install the global subscriber. Safe to call more than once.
///
/// `TNEA_LOG` wins when set; otherwise `verbosity` (the `-v` count) picks the
/// crate level: 0 = warn, 1 = info, 2+ = debug. Logs go to stderr so report
/// output on stdout stays pipeable.
pub fn init_tracing(verbosity: u8) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .with(filter)
            .init();
    });
}

fn default_directive(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    format!("tnea_predictor={level}")
}
