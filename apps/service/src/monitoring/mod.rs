/// Monitoring engine module
///
/// - `prober` times a warm-up POST against a function URL
/// - `sweep` probes every enabled monitored function once and stores samples
/// - `scheduler` repeats the sweep on a fixed interval under a time ceiling
pub mod prober;
pub mod scheduler;
pub mod sweep;

pub use prober::{HttpProber, Prober};
pub use scheduler::SweepScheduler;
pub use sweep::{Sweep, SweepReport};
