use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize test logging with appropriate log level
///
/// This ensures logs are only shown when tests fail or when LOG_LEVEL env var is set.
/// Usage: Call init_test_logging() at the beginning of each test file.
pub fn init_test_logging() {
    INIT.call_once(|| {
        // Default to error level in tests to reduce noise
        let level = match std::env::var("LOG_LEVEL").as_deref() {
            Ok("warn") => "warn",
            Ok("info") => "info",
            Ok("debug") => "debug",
            Ok("trace") => "trace",
            _ => "error",
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(level))
            .with_test_writer()
            .try_init();
    });
}
