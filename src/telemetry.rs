//! Tracing setup for shells embedding the engine.

use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a global `tracing` subscriber.
///
/// Honors `RUST_LOG`, falling back to `info,tictactoe_engine=debug`. Safe to
/// call more than once; later calls leave the first subscriber in place.
pub fn init_tracing() {
    let installed = tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tictactoe_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok();

    if installed {
        info!("Tracing initialized");
    }
}
