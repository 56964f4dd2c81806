//! Logging Infrastructure
//!
//! Console logging through `tracing-subscriber`. `RUST_LOG` overrides the
//! default filter.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const DEFAULT_FILTER: &str = "shop_server=info,tower_http=info";

/// Initialize the global subscriber
///
/// # Arguments
/// * `default_filter` - Filter used when `RUST_LOG` is unset
/// * `json_format` - JSON lines for production, pretty output for development
pub fn init_logger(default_filter: &str, json_format: bool) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let subscriber = tracing_subscriber::registry().with(env_filter);

    if json_format {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()?;
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .try_init()?;
    }

    Ok(())
}
