//! Periodic execution of the crawl pipeline.
//!
//! At most one cycle runs at a time: a tick that finds a cycle in flight
//! is skipped, while an explicit trigger waits for it to finish. Cycles
//! started by other processes hold the database lease, and a tick that
//! meets one is skipped as well.

use std::ops::RangeInclusive;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use super::pipeline::{CycleReport, Pipeline, PipelineError};

/// Allowed tick interval, in seconds.
pub const INTERVAL_BOUNDS_SECS: RangeInclusive<u64> = 300..=600;

/// Clamp a configured interval into [`INTERVAL_BOUNDS_SECS`].
pub fn clamp_interval(seconds: u64) -> Duration {
    Duration::from_secs(seconds.clamp(*INTERVAL_BOUNDS_SECS.start(), *INTERVAL_BOUNDS_SECS.end()))
}

/// Run a cycle unless one is already running. Returns `None` when skipped.
async fn run_if_idle(
    pipeline: &Pipeline,
    run_lock: &Mutex<()>,
) -> Option<Result<CycleReport, PipelineError>> {
    let Ok(_guard) = run_lock.try_lock() else {
        info!("Previous cycle still running, skipping tick");
        return None;
    };
    Some(pipeline.run_cycle().await)
}

/// Starts the background ticker.
pub struct Scheduler;

impl Scheduler {
    /// Spawn the ticker. The first cycle runs immediately.
    pub fn start(pipeline: Pipeline, interval_seconds: u64) -> SchedulerHandle {
        let interval = clamp_interval(interval_seconds);
        let run_lock = Arc::new(Mutex::new(()));
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = {
            let pipeline = pipeline.clone();
            let run_lock = Arc::clone(&run_lock);
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(interval);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                info!("Scheduler started, interval {}s", interval.as_secs());

                loop {
                    tokio::select! {
                        _ = ticker.tick() => {
                            match run_if_idle(&pipeline, &run_lock).await {
                                Some(Err(PipelineError::Busy)) => {
                                    info!("Cycle running in another process, skipping tick");
                                }
                                Some(Err(e)) => error!("Scheduled cycle failed: {}", e),
                                _ => {}
                            }
                        }
                        _ = shutdown_rx.changed() => break,
                    }
                }
                debug!("Scheduler loop exited");
            })
        };

        SchedulerHandle {
            pipeline,
            run_lock,
            shutdown_tx,
            task,
            interval,
        }
    }
}

/// Handle to a running scheduler.
pub struct SchedulerHandle {
    pipeline: Pipeline,
    run_lock: Arc<Mutex<()>>,
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    interval: Duration,
}

impl SchedulerHandle {
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run a cycle now, waiting for any in-flight cycle first.
    pub async fn trigger(&self) -> Result<CycleReport, PipelineError> {
        let _guard = self.run_lock.lock().await;
        info!("Manual cycle triggered");
        self.pipeline.run_cycle().await
    }

    /// Stop ticking and wait for the loop (and any running cycle) to end.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            error!("Scheduler task ended abnormally: {}", e);
        }
        info!("Scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::run_locks;
    use crate::repository::test_support::setup_test_db;
    use crate::services::CYCLE_LOCK;
    use crate::scrapers::{PageFetcher, UniversalCrawler};
    use async_trait::async_trait;

    struct Offline;

    #[async_trait]
    impl PageFetcher for Offline {
        async fn fetch(&self, _url: &str) -> Option<String> {
            None
        }
    }

    fn pipeline(db: crate::repository::DbContext) -> Pipeline {
        Pipeline::new(db, Arc::new(Offline), Arc::new(UniversalCrawler::default()))
    }

    #[test]
    fn test_clamp_interval() {
        assert_eq!(clamp_interval(10), Duration::from_secs(300));
        assert_eq!(clamp_interval(450), Duration::from_secs(450));
        assert_eq!(clamp_interval(3600), Duration::from_secs(600));
    }

    #[tokio::test]
    async fn test_busy_lock_skips_tick() {
        let (db, _dir) = setup_test_db().await;
        let pipeline = pipeline(db);
        let lock = Mutex::new(());

        let guard = lock.lock().await;
        assert!(run_if_idle(&pipeline, &lock).await.is_none());
        drop(guard);

        let report = run_if_idle(&pipeline, &lock).await.unwrap().unwrap();
        assert_eq!(report, CycleReport::default());
    }

    #[tokio::test]
    async fn test_cycle_refused_while_lease_held_elsewhere() {
        let (db, _dir) = setup_test_db().await;
        let pipeline = pipeline(db.clone());

        let mut conn = db.pool().get().await.unwrap();
        let lease = chrono::Duration::minutes(30);
        let now = chrono::Utc::now();
        let acquired = run_locks::try_acquire(&mut conn, CYCLE_LOCK, "other-process", now, lease)
            .await
            .unwrap();
        assert!(acquired);

        let lock = Mutex::new(());
        let outcome = run_if_idle(&pipeline, &lock).await.unwrap();
        assert!(matches!(outcome, Err(PipelineError::Busy)));

        run_locks::release(&mut conn, CYCLE_LOCK, "other-process").await.unwrap();
        assert!(run_if_idle(&pipeline, &lock).await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_trigger_and_shutdown() {
        let (db, _dir) = setup_test_db().await;
        let handle = Scheduler::start(pipeline(db), 1);
        assert_eq!(handle.interval(), Duration::from_secs(300));

        let report = handle.trigger().await.unwrap();
        assert_eq!(report.targets, 0);

        handle.shutdown().await;
    }
}
