//! Shared tracing setup for the warmwatch binaries.

mod subscriber;

/// Install the global subscriber with `INFO` as the default level.
///
/// The binaries call this before anything else.
pub fn init_tracing() {
    subscriber::init();
}
