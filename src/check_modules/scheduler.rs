use std::future::Future;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::info;

use super::error::CheckError;
use super::runner::CheckRunner;

/// Drives the runner on a fixed period. Each cycle runs to completion before
/// the next tick is taken; ticks missed during a long cycle are skipped.
pub struct Scheduler {
    runner: CheckRunner,
}

impl Scheduler {
    pub fn new(runner: CheckRunner) -> Self {
        Self { runner }
    }

    /// Ticks immediately, then every `schedule`, until `shutdown` resolves.
    /// Shutdown also interrupts a cycle in flight; that cycle is not reported.
    /// Returns the number of completed cycles.
    pub async fn run_until<F>(&self, shutdown: F) -> Result<u64, CheckError>
    where
        F: Future<Output = ()>,
    {
        let period = self.runner.config().schedule.max(Duration::from_millis(1));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(period_ms = period.as_millis() as u64, "Scheduler started.");
        let mut cycles = 0u64;
        loop {
            tokio::select! {
                biased;
                _ = &mut shutdown => {
                    info!(cycles, "Shutdown signal received, stopping scheduler.");
                    break;
                }
                _ = interval.tick() => {
                    // The running cycle is abandoned if shutdown arrives mid-request.
                    tokio::select! {
                        biased;
                        _ = &mut shutdown => {
                            info!(cycles, "Shutdown signal received during a cycle, stopping scheduler.");
                            break;
                        }
                        result = self.runner.run_and_report() => {
                            result?;
                            cycles += 1;
                        }
                    }
                }
            }
        }
        Ok(cycles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check_modules::config::Config;
    use std::sync::Arc;

    fn empty_config(schedule_ms: u64) -> Arc<Config> {
        Arc::new(Config {
            schedule: Duration::from_millis(schedule_ms),
            base_url: "http://127.0.0.1".to_string(),
            port: 80,
            verbose: false,
            fail_fast: false,
            timeout: None,
            log_dir: None,
            jobs: Vec::new(),
        })
    }

    #[tokio::test]
    async fn test_first_cycle_runs_immediately() {
        let scheduler = Scheduler::new(CheckRunner::new(empty_config(60_000)).unwrap());
        let cycles = scheduler
            .run_until(tokio::time::sleep(Duration::from_millis(100)))
            .await
            .unwrap();
        assert_eq!(cycles, 1);
    }

    #[tokio::test]
    async fn test_cycles_repeat_on_interval() {
        let scheduler = Scheduler::new(CheckRunner::new(empty_config(50)).unwrap());
        let cycles = scheduler
            .run_until(tokio::time::sleep(Duration::from_millis(275)))
            .await
            .unwrap();
        assert!((3..=7).contains(&cycles), "ran {cycles} cycles");
    }

    #[tokio::test]
    async fn test_resolved_shutdown_runs_nothing() {
        let scheduler = Scheduler::new(CheckRunner::new(empty_config(10)).unwrap());
        let cycles = scheduler.run_until(std::future::ready(())).await.unwrap();
        assert_eq!(cycles, 0);
    }
}
