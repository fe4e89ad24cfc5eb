use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vaultkv_core::VAULTKV_LOG_VAR;

// Re-export tracing macros for convenience
pub use tracing::{debug, error, info, span, trace, warn, Level, Span};

/// Initialize a stderr subscriber.
///
/// The filter is read from `VAULTKV_LOG` (same syntax as `RUST_LOG`) and
/// falls back to `info`. Fails if a global subscriber is already installed.
pub fn init() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .compact()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(env_filter("info"))
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}

/// Install a subscriber that writes through the test harness capture.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_for_tests() {
    let _ = tracing_subscriber::registry()
        .with(env_filter("debug"))
        .with(fmt::layer().with_test_writer())
        .try_init();
}

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(VAULTKV_LOG_VAR).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Create a span covering one store instance's operations
pub fn store_span(snapshot: &std::path::Path) -> Span {
    span!(Level::INFO, "store", snapshot = %snapshot.display())
}

/// Emit a structured event once a load/compaction cycle finishes
pub fn load_completed(records: usize, tombstones: usize, entries: usize, truncated_log: bool) {
    info!(
        records = %records,
        tombstones = %tombstones,
        entries = %entries,
        truncated_log = %truncated_log,
        "load_completed"
    );
}

/// Emit a structured event for one appended log record
pub fn record_appended(operation: &str, bytes: usize) {
    debug!(operation = %operation, bytes = %bytes, "record_appended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_for_tests_is_repeatable() {
        init_for_tests();
        init_for_tests();

        let span = store_span(std::path::Path::new("db"));
        span.in_scope(|| {
            load_completed(3, 1, 2, true);
            record_appended("set", 25);
        });
    }

    #[test]
    fn test_init_fails_once_a_subscriber_exists() {
        init_for_tests();
        assert!(init().is_err());
    }
}
