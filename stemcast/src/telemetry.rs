//! Tracing initialization (fmt subscriber with env-based filtering).
//!
//! Log verbosity is controlled via the standard `RUST_LOG` environment
//! variable; when unset, `info` and above are emitted. Per-request spans are
//! added by the HTTP trace layer in [`crate::build_router`].

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize the tracing subscriber for console logging.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    Ok(())
}
