//! Tracing setup for the embedding shell.

use tracing::Level;

/// Install the global fmt subscriber. Uses `try_init` so repeated calls
/// (tests share one process) are no-ops.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .try_init();
}
