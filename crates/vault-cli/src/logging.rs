//! Tracing subscriber setup.
//!
//! Diagnostics go to stderr so stdout stays usable in pipelines.

use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// `VAULT_LOG` wins over `RUST_LOG`; `--verbose` replaces both with `debug`.
pub fn init_logging(verbose: bool, quiet: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("VAULT_LOG")
            .or_else(|_| EnvFilter::try_from_default_env())
            .unwrap_or_else(|_| EnvFilter::new(if quiet { "error" } else { "warn" }))
    };

    // Only the first subscriber installed in a process takes effect.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
