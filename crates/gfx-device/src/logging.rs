use tracing_subscriber::EnvFilter;

use crate::gfx_error::GfxResult;

const DEFAULT_FILTER: &str = "info";

/// Installs color-eyre and the fmt subscriber. `RUST_LOG` overrides the
/// default `info` filter.
pub fn init_logging() -> GfxResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt::SubscriberBuilder::default()
        .with_env_filter(env_filter())
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .with_target(false)
        .try_init()
        .map_err(|e| eyre::eyre!("failed to install tracing subscriber: {e}"))?;
    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
