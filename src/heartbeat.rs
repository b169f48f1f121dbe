use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{info, warn};

use crate::relay::{RelayStats, StatsSnapshot};

/// Periodic report of what the relay did since the previous beat, so a quiet
/// relay can be told apart from a stuck one.
pub struct Heartbeat {
    scheduler: JobScheduler,
}

impl Heartbeat {
    /// Schedule the report on a six-field cron expression (seconds first)
    /// and start ticking.
    pub async fn start(cron_expr: &str, stats: Arc<RelayStats>) -> Result<Self> {
        let job = beat_job(cron_expr, stats)?;
        let scheduler = JobScheduler::new()
            .await
            .context("Failed to create heartbeat scheduler")?;
        scheduler
            .add(job)
            .await
            .context("Failed to add heartbeat job")?;
        scheduler
            .start()
            .await
            .context("Failed to start heartbeat scheduler")?;
        info!("Heartbeat scheduled with cron: {}", cron_expr);
        Ok(Self { scheduler })
    }

    pub async fn stop(mut self) -> Result<()> {
        self.scheduler
            .shutdown()
            .await
            .context("Failed to stop heartbeat scheduler")?;
        info!("Heartbeat stopped");
        Ok(())
    }
}

fn beat_job(cron_expr: &str, stats: Arc<RelayStats>) -> Result<Job> {
    let last = Arc::new(Mutex::new(StatsSnapshot::default()));
    Job::new_async(cron_expr, move |_uuid, _lock| {
        let stats = stats.clone();
        let last = last.clone();
        Box::pin(async move {
            let mut last = last.lock().await;
            beat(&mut last, stats.snapshot());
        })
    })
    .with_context(|| format!("Invalid heartbeat cron expression: {}", cron_expr))
}

/// Log the counts since `last` and advance it. Returns what was logged.
fn beat(last: &mut StatsSnapshot, current: StatsSnapshot) -> StatsSnapshot {
    let delta = current.since(last);
    *last = current;
    if delta.failed_deliveries > 0 {
        warn!("Heartbeat: {} (total {})", delta, current);
    } else {
        info!("Heartbeat: {} (total {})", delta, current);
    }
    delta
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(received: u64, relayed: u64, skipped: u64, failed: u64) -> StatsSnapshot {
        StatsSnapshot {
            received,
            relayed,
            skipped,
            failed_deliveries: failed,
        }
    }

    #[test]
    fn test_beat_reports_activity_since_previous_beat() {
        let mut last = StatsSnapshot::default();
        assert_eq!(beat(&mut last, counts(5, 3, 2, 1)), counts(5, 3, 2, 1));
        assert_eq!(beat(&mut last, counts(8, 5, 3, 1)), counts(3, 2, 1, 0));
        assert_eq!(last, counts(8, 5, 3, 1));
    }

    #[test]
    fn test_idle_beat_is_all_zero() {
        let mut last = counts(4, 4, 0, 0);
        assert_eq!(beat(&mut last, counts(4, 4, 0, 0)), StatsSnapshot::default());
    }

    #[test]
    fn test_malformed_cron_is_rejected() {
        let stats = Arc::new(RelayStats::default());
        assert!(beat_job("every hour please", stats).is_err());
    }

    #[tokio::test]
    async fn test_start_and_stop_with_default_cron() {
        let heartbeat = Heartbeat::start("0 0 * * * *", Arc::new(RelayStats::default()))
            .await
            .unwrap();
        heartbeat.stop().await.unwrap();
    }
}
