use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `studytrack_core=debug`.
pub const LOG_ENV: &str = "STUDYTRACK_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Send logs to stderr so stdout stays machine-readable.
pub fn enable_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
