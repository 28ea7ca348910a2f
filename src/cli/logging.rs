//! Logging setup
//!
//! Logs go to stderr so table output on stdout stays pipeable.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::cli::GlobalOpts;

/// Initialize the global subscriber; `RUST_LOG` overrides the CLI verbosity
pub fn init_logging(global: &GlobalOpts) {
    let default_level = if global.verbose {
        "bbt=debug"
    } else if global.quiet {
        "bbt=warn"
    } else {
        "bbt=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();
}
