//! Logging infrastructure for the kiln CLI.
//!
//! Structured logging via the `tracing` ecosystem with verbosity flags and
//! `RUST_LOG` support.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Call once at program start, before any logging occurs.
///
/// # Verbosity
///
/// 1. `--verbose`: debug level for kiln crates
/// 2. `--quiet`: errors only
/// 3. `RUST_LOG` environment variable
/// 4. Default: info level for kiln crates
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new("kiln=debug,kiln_pipeline=debug,kiln_config=debug,kiln_cli=debug")
    } else if quiet {
        EnvFilter::new("kiln=error,kiln_pipeline=error,kiln_cli=error")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("kiln=info,kiln_pipeline=info,kiln_cli=info"))
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
