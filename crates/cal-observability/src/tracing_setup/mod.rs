//! Tracing setup: subscriber initialization, span definitions, and
//! structured lifecycle events.

pub mod events;
pub mod spans;

use std::sync::Once;

use cal_core::config::ObservabilityConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "CAL_LOG";

/// Directives used when `CAL_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "cal=info";

/// Initialize the tracing subscriber with human-readable output.
///
/// Reads `CAL_LOG` for per-crate levels, e.g.
/// `CAL_LOG=cal_sampling=debug,cal_learning=info`. Falls back to `cal=info`.
///
/// Idempotent: only the first call installs a subscriber.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    install(filter, false);
}

/// Initialize tracing with a custom filter string (for testing or embedding).
pub fn init_tracing_with_filter(filter: &str) {
    install(EnvFilter::new(filter), false);
}

/// Initialize tracing from the `[observability]` config section.
///
/// `CAL_LOG` still wins when set; otherwise `log_level` applies to every
/// `cal*` target.
pub fn init_tracing_from_config(config: &ObservabilityConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("cal={}", config.log_level)));
    install(filter, config.json_logs);
}

fn install(filter: EnvFilter, json: bool) {
    INIT.call_once(|| {
        let registry = tracing_subscriber::registry().with(filter);
        // A subscriber installed elsewhere (e.g. by a test harness) wins.
        let _ = if json {
            registry
                .with(
                    fmt::layer()
                        .json()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .try_init()
        } else {
            registry
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_thread_ids(true)
                        .with_file(true)
                        .with_line_number(true),
                )
                .try_init()
        };
    });
}
