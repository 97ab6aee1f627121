use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval, timeout};

use super::sweep::{Sweep, SweepReport};
use crate::config::SweepConfig;

/// Runs the sweep on a fixed wall-clock interval
pub struct SweepScheduler {
    sweep: Arc<Sweep>,
    interval: Duration,
    max_execution: Duration,
}

impl SweepScheduler {
    pub fn new(sweep: Arc<Sweep>, config: &SweepConfig) -> Self {
        Self { sweep, interval: config.interval(), max_execution: config.max_execution() }
    }

    /// Run a single sweep bounded by the execution ceiling.
    ///
    /// On timeout the unfinished units are dropped; samples already written
    /// stay in the store. Returns `None` when the sweep did not complete.
    pub async fn run_once(&self) -> Option<SweepReport> {
        match timeout(self.max_execution, self.sweep.run()).await {
            Ok(Ok(report)) => Some(report),
            Ok(Err(e)) => {
                tracing::error!("Sweep failed: {:#}", e);
                None
            }
            Err(_) => {
                tracing::error!("Sweep exceeded its {:?} execution ceiling", self.max_execution);
                None
            }
        }
    }

    /// Start the periodic sweep; the first one runs immediately
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut timer = interval(self.interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                timer.tick().await;
                self.run_once().await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{FunctionIdentity, MonitorRecord};
    use crate::database::testing::temp_database;
    use crate::database::Database;
    use crate::monitoring::prober::Prober;

    /// Never answers within the test's execution ceiling
    struct StalledProber;

    #[async_trait::async_trait]
    impl Prober for StalledProber {
        async fn probe(&self, _target: &str) -> Option<u64> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Some(0)
        }
    }

    struct InstantProber;

    #[async_trait::async_trait]
    impl Prober for InstantProber {
        async fn probe(&self, _target: &str) -> Option<u64> {
            Some(1)
        }
    }

    fn enabled_record() -> MonitorRecord {
        MonitorRecord {
            identity: FunctionIdentity {
                function_name: "f1".to_string(),
                project_id: "p1".to_string(),
                region: "us".to_string(),
                tag: None,
            },
            function_url: Some("https://x".to_string()),
            enabled: true,
        }
    }

    fn config(max_execution_seconds: u64) -> SweepConfig {
        SweepConfig { interval_seconds: 1, max_execution_seconds }
    }

    #[tokio::test]
    async fn test_run_once_respects_ceiling() {
        let (_dir, database) = temp_database().await.unwrap();
        let id = database.add_monitor(&enabled_record()).await.unwrap();

        let sweep = Arc::new(Sweep::new(database.clone(), Arc::new(StalledProber)));
        let scheduler = SweepScheduler::new(sweep, &config(1));

        assert_eq!(scheduler.run_once().await, None);
        assert!(database.get_samples(&id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_start_sweeps_periodically() {
        let (_dir, database) = temp_database().await.unwrap();
        let id = database.add_monitor(&enabled_record()).await.unwrap();

        let sweep = Arc::new(Sweep::new(database.clone(), Arc::new(InstantProber)));
        let handle = SweepScheduler::new(sweep, &config(5)).start();

        tokio::time::sleep(Duration::from_millis(1500)).await;
        handle.abort();

        assert!(database.get_samples(&id).await.unwrap().len() >= 2);
    }
}
