//! Optional tracing setup for hosts without their own subscriber.
//!
//! The crate only emits `tracing` events; what to do with them is the
//! surrounding application's decision. Hosts that already install a
//! subscriber can ignore this module entirely.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

/// Installs a formatting `tracing` subscriber filtered by `RUST_LOG`
/// (default `info`). Safe to call more than once; only the first call has
/// any effect, and an already-installed global subscriber is left in place.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .try_init();
    });
}
