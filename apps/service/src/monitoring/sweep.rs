use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::prober::Prober;
use crate::database::Database;
use crate::database::models::{MonitorFilter, Sample};

/// Outcome counts of one sweep
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Enabled records with a URL
    pub probed: usize,
    /// Samples written to the store
    pub recorded: usize,
    /// Recorded samples without a duration
    pub missing_duration: usize,
    /// Units whose sample could not be written
    pub failed: usize,
}

/// Probes every enabled monitored function once and records the latency
pub struct Sweep {
    database: Arc<dyn Database>,
    prober: Arc<dyn Prober>,
}

impl Sweep {
    pub fn new(database: Arc<dyn Database>, prober: Arc<dyn Prober>) -> Self {
        Self { database, prober }
    }

    /// Run one sweep.
    ///
    /// Every target is probed in its own task; a failing unit is logged and
    /// counted, never propagated to the others. Only the initial listing of
    /// monitors can fail the sweep as a whole.
    pub async fn run(&self) -> Result<SweepReport> {
        let monitors = self.database.find_monitors(&MonitorFilter::new()).await?;
        let mut report = SweepReport::default();
        let mut units = JoinSet::new();

        for monitor in monitors {
            let Some(target) = monitor.probe_target().map(str::to_string) else {
                continue;
            };
            report.probed += 1;

            let database = Arc::clone(&self.database);
            let prober = Arc::clone(&self.prober);
            let monitor_id = monitor.id;
            units.spawn(async move {
                let duration = prober.probe(&target).await;
                let sample = Sample::now(duration);
                let written = database.add_sample(&monitor_id, &sample).await;
                (monitor_id, sample, written)
            });
        }

        info!("Sweeping {} monitored functions", report.probed);

        while let Some(joined) = units.join_next().await {
            match joined {
                Ok((monitor_id, sample, Ok(_))) => {
                    report.recorded += 1;
                    match sample.response_duration {
                        Some(duration) => debug!("Recorded {}ms for {}", duration, monitor_id),
                        None => {
                            report.missing_duration += 1;
                            warn!("Recorded sample without duration for {}", monitor_id);
                        }
                    }
                }
                Ok((monitor_id, _, Err(e))) => {
                    report.failed += 1;
                    error!("Failed to store sample for {}: {:#}", monitor_id, e);
                }
                Err(e) => {
                    report.failed += 1;
                    error!("Sweep unit aborted: {}", e);
                }
            }
        }

        info!(
            "Sweep completed: {} probed, {} recorded, {} without duration, {} failed",
            report.probed, report.recorded, report.missing_duration, report.failed
        );
        Ok(report)
    }
}
