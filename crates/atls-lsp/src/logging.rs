use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `ATLS_LOG=atls_analysis=debug`.
const LOG_ENV: &str = "ATLS_LOG";

/// Log to stderr; stdout carries the protocol.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true)
        .init();
}
