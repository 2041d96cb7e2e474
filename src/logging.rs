use tracing::Level;

/// Install a fmt subscriber for binaries and tests that want mixer logs.
/// Opt-in; library code only emits events and never sets a subscriber.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .try_init();
}
