//! Subscriber initialisation. The filter comes from `AISLE_LOG`, falling
//! back to the configured level.

pub mod events;
pub mod spans;

use aisle_core::config::ObservabilityConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "AISLE_LOG";

/// Initialise the global subscriber with default settings.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_tracing() -> bool {
    init_tracing_with(&ObservabilityConfig::default())
}

/// Initialise the global subscriber from config.
pub fn init_tracing_with(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if config.json {
        builder.json().with_current_span(true).try_init()
    } else {
        builder.compact().try_init()
    };
    result.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_init_reports_already_installed() {
        let _ = init_tracing();
        assert!(!init_tracing());
    }
}
