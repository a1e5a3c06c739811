/*!
 * Logging setup for binaries
 *
 * Log output goes to stderr so that rendered views and exports on stdout
 * stay machine-readable.
 */

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding an `EnvFilter` directive string
pub const LOG_ENV_VAR: &str = "DOCDIR_LOG";

/// Initialize the global subscriber
///
/// `DOCDIR_LOG` wins when set; otherwise `verbose` selects `docdir=debug`
/// over the default `docdir=info`. Calling this twice is a no-op.
pub fn init_logging(verbose: bool) {
    let default_directive = if verbose { "docdir=debug" } else { "docdir=info" };
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .try_init();
}
