//! Periodic store refresh on the server runtime.
//!
//! The job runs once right away, then on every tick of the interval. Each
//! run is moved onto the blocking pool so the indexer never stalls request
//! handling.

use log::{error, info, warn};
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracer_core::StoreRefresher;

/// Handle to a running refresh schedule.
///
/// Dropping it ends the schedule after any in-flight run.
pub struct RefreshTask {
    stop_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl RefreshTask {
    /// Signals the schedule and waits for an in-flight run to finish.
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(err) = self.handle.await {
            warn!("event=refresh_schedule module=refresh status=error reason=task_failed error={err}");
        }
    }
}

/// Spawns the schedule for `job` on the current tokio runtime.
pub fn spawn_refresh<J: StoreRefresher>(interval: Duration, job: J) -> RefreshTask {
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let handle = tokio::spawn(async move {
        info!(
            "event=refresh_schedule module=refresh status=start interval_secs={}",
            interval.as_secs()
        );
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut job = Some(job);

        loop {
            tokio::select! {
                biased;

                // Explicit stop, or the handle was dropped.
                _ = stop_rx.changed() => break,

                _ = ticker.tick() => {
                    let Some(current) = job.take() else { break };
                    job = run_once(current).await;
                }
            }
        }
        info!("event=refresh_schedule module=refresh status=stopped");
    });

    RefreshTask { stop_tx, handle }
}

/// Runs `job` once; `None` when the run panicked and the job is lost.
async fn run_once<J: StoreRefresher>(mut job: J) -> Option<J> {
    let started_at = Instant::now();
    let outcome = tokio::task::spawn_blocking(move || {
        let result = job.refresh();
        (job, result)
    })
    .await;
    let duration_ms = started_at.elapsed().as_millis();

    match outcome {
        Ok((job, Ok(()))) => {
            info!("event=refresh_run module=refresh status=ok duration_ms={duration_ms}");
            Some(job)
        }
        Ok((job, Err(err))) => {
            error!(
                "event=refresh_run module=refresh status=error duration_ms={duration_ms} error={err}"
            );
            Some(job)
        }
        Err(err) => {
            error!(
                "event=refresh_run module=refresh status=error duration_ms={duration_ms} reason=job_panicked error={err}"
            );
            None
        }
    }
}
