// Logging setup.
//
// Diagnostics go through `tracing`; the level is read from RUST_LOG and
// defaults to `info`. Diagnostics go to stderr so they stay out of the menu
// text and report previews on stdout.
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber. Call once from `main`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Verbose subscriber routed through the test harness writer. Safe to call
/// from several tests.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
