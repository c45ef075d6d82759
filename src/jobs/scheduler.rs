//! Job scheduler — turns a submission into a tracked, asynchronously
//! executed unit of work.
//!
//! `submit` validates the task name, creates the job record, and spawns one
//! tokio task per job. A semaphore caps how many executors run at once
//! without ever blocking submission: jobs past the cap simply stay
//! `scheduled` until a permit frees up.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::SubmitError;
use crate::jobs::store::JobStore;
use crate::tasks::executor::TaskExecutor;
use crate::tasks::registry::TaskRegistry;

/// Schedules and tracks task executions.
pub struct JobScheduler {
    registry: Arc<TaskRegistry>,
    store: Arc<JobStore>,
    permits: Arc<Semaphore>,
}

impl JobScheduler {
    /// Create a scheduler over a finished registry and an empty store.
    pub fn new(registry: Arc<TaskRegistry>, store: Arc<JobStore>, max_parallel_jobs: usize) -> Self {
        Self {
            registry,
            store,
            permits: Arc::new(Semaphore::new(max_parallel_jobs.max(1))),
        }
    }

    /// Submit a task for asynchronous execution.
    ///
    /// Fails with `UnknownTask` before any job record is created, so unknown
    /// tasks never produce phantom jobs. On success the id is returned
    /// immediately; execution latency never shows up in submission latency.
    pub async fn submit(
        &self,
        task: &str,
        payload: serde_json::Value,
    ) -> Result<Uuid, SubmitError> {
        let executor = self
            .registry
            .lookup(task)
            .ok_or_else(|| SubmitError::UnknownTask {
                name: task.to_string(),
            })?;

        let id = self.store.create(task, payload.clone()).await;

        let store = Arc::clone(&self.store);
        let permits = Arc::clone(&self.permits);
        tokio::spawn(async move {
            run_job(store, permits, executor, id, payload).await;
        });

        info!(job_id = %id, task = %task, "Job submitted");
        Ok(id)
    }

    /// The store backing this scheduler.
    pub fn store(&self) -> &Arc<JobStore> {
        &self.store
    }

    /// The registry backing this scheduler.
    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }
}

/// Drive one job through its lifecycle.
///
/// Every failure mode — executor error, executor panic, store refusal — is
/// contained here; nothing propagates to other jobs or to the caller.
async fn run_job(
    store: Arc<JobStore>,
    permits: Arc<Semaphore>,
    executor: Arc<dyn TaskExecutor>,
    id: Uuid,
    payload: serde_json::Value,
) {
    let _permit = match Arc::clone(&permits).acquire_owned().await {
        Ok(permit) => permit,
        Err(_) => {
            // Semaphore closed — only possible during shutdown.
            warn!(job_id = %id, "Scheduler shutting down, job never started");
            return;
        }
    };

    if let Err(e) = store.mark_running(id).await {
        // Record vanished (store reset) or was tampered with; nothing to run.
        debug!(job_id = %id, error = %e, "Skipping job that cannot start");
        return;
    }

    // The executor runs in its own task so a panic inside it is caught at
    // the join point instead of unwinding through the scheduler.
    let outcome = tokio::spawn(async move { executor.execute(payload).await }).await;

    let marked = match outcome {
        Ok(Ok(result)) => store.mark_done(id, result).await,
        Ok(Err(task_err)) => store.mark_error(id, task_err.to_string()).await,
        Err(join_err) => {
            store
                .mark_error(id, format!("task panicked: {join_err}"))
                .await
        }
    };

    if let Err(e) = marked {
        debug!(job_id = %id, error = %e, "Could not record job outcome");
    }
}
