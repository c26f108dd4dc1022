//! Logging bootstrap.
//!
//! Diagnostics go to stderr so stdout stays clean for report output
//! (text or JSON). `RUST_LOG` overrides the verbosity flag.

use tracing_subscriber::EnvFilter;

pub fn init(verbose: bool) {
    let fallback = if verbose {
        "sleuth_engine=debug,sleuth_common=debug,sleuthctl=debug,info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
