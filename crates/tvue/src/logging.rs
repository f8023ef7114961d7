//! Opt-in `tracing` output.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives.
pub const ENV_VAR: &str = "TVUE_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Install a global fmt subscriber filtered by `TVUE_LOG` (default `warn`).
///
/// Returns `false` when a global subscriber was already installed.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_env(ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
