//! Tracing initialization
//!
//! Installed once by the embedding application; the library crates only
//! emit `tracing` events and never install a subscriber themselves.
//! `RUST_LOG` overrides the configured level when set.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::ObservabilitySettings;

/// Install the global tracing subscriber
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing(settings: &ObservabilitySettings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| settings.log_level.clone().into());

    let fmt_layer = if settings.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init();
}
