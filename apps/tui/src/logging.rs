use tracing::Level;

/// Installs the global subscriber. Logs go to stderr; the dashboard owns stdout.
pub fn init(debug: bool) {
    let level = if debug { Level::DEBUG } else { Level::WARN };

    // A second install (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .try_init();
}
