use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "info,hourly_energy_model=info";

/// Install the global subscriber.
///
/// `RUST_LOG` overrides [`DEFAULT_FILTER`]. Output is JSON lines unless
/// `HOURLY_LOG=pretty` is set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("HOURLY_LOG").map(|v| v == "pretty").unwrap_or(false) {
        registry.with(fmt::layer().pretty()).init();
    } else {
        registry.with(fmt::layer().json()).init();
    }
}
