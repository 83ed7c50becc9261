// src/infra/logger.rs — tracing setup for scoring runs

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the global subscriber. `RUST_LOG` wins when set; otherwise the
/// given level applies globally with dermbench's own events kept at `info`,
/// so retry and truncation messages stay visible without reqwest noise.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(default_level)));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn default_filter(default_level: &str) -> String {
    format!("{default_level},dermbench=info")
}
