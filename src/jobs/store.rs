//! In-memory job store with safe concurrent access.
//!
//! The store exclusively owns job records once created. All mutation happens
//! under one write lock; readers receive snapshot clones, never references.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::JobError;
use crate::jobs::model::{Job, JobStatus};

struct StoreInner {
    jobs: HashMap<Uuid, Job>,
    /// Insertion order, oldest first. `list()` walks it in reverse so the
    /// most recently created job comes first, with deterministic ties.
    order: Vec<Uuid>,
}

/// Process-wide in-memory job store.
pub struct JobStore {
    inner: RwLock<StoreInner>,
}

impl JobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreInner {
                jobs: HashMap::new(),
                order: Vec::new(),
            }),
        }
    }

    /// Insert a fresh `scheduled` record and return its id.
    pub async fn create(&self, task: &str, payload: serde_json::Value) -> Uuid {
        let job = Job::new(task, payload);
        let id = job.id;

        let mut inner = self.inner.write().await;
        inner.jobs.insert(id, job);
        inner.order.push(id);

        debug!(job_id = %id, task = %task, "Job created");
        id
    }

    /// Transition a job to `running` and stamp `started_at`.
    pub async fn mark_running(&self, id: Uuid) -> Result<(), JobError> {
        self.transition(id, JobStatus::Running, |job| {
            job.started_at = Some(Utc::now());
        })
        .await
    }

    /// Transition a job to `done`, storing the executor's result.
    pub async fn mark_done(&self, id: Uuid, result: serde_json::Value) -> Result<(), JobError> {
        self.transition(id, JobStatus::Done, |job| {
            job.finished_at = Some(Utc::now());
            job.result = Some(result);
        })
        .await?;
        info!(job_id = %id, "Job done");
        Ok(())
    }

    /// Transition a job to `error`, storing the failure description.
    pub async fn mark_error(&self, id: Uuid, error: impl Into<String>) -> Result<(), JobError> {
        let error = error.into();
        self.transition(id, JobStatus::Error, |job| {
            job.finished_at = Some(Utc::now());
            job.error = Some(error);
        })
        .await?;
        warn!(job_id = %id, "Job failed");
        Ok(())
    }

    /// Get a snapshot of a job.
    pub async fn get(&self, id: Uuid) -> Option<Job> {
        self.inner.read().await.jobs.get(&id).cloned()
    }

    /// Snapshots of all jobs, most recently created first.
    pub async fn list(&self) -> Vec<Job> {
        let inner = self.inner.read().await;
        inner
            .order
            .iter()
            .rev()
            .filter_map(|id| inner.jobs.get(id))
            .cloned()
            .collect()
    }

    /// Number of jobs in the store (all statuses).
    pub async fn len(&self) -> usize {
        self.inner.read().await.jobs.len()
    }

    /// Check if the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.jobs.is_empty()
    }

    /// Clear all state. Test isolation only; never called on the serving path.
    pub async fn reset(&self) {
        let mut inner = self.inner.write().await;
        inner.jobs.clear();
        inner.order.clear();
    }

    /// Apply a status transition plus its field updates atomically.
    ///
    /// The closure runs while the write guard is held, so two near-simultaneous
    /// completions can never race to set conflicting final states.
    async fn transition(
        &self,
        id: Uuid,
        target: JobStatus,
        apply: impl FnOnce(&mut Job),
    ) -> Result<(), JobError> {
        let mut inner = self.inner.write().await;
        let job = inner.jobs.get_mut(&id).ok_or(JobError::NotFound { id })?;

        if !job.status.can_transition_to(target) {
            warn!(
                job_id = %id,
                from = %job.status,
                to = %target,
                "Rejected illegal job transition"
            );
            return Err(JobError::InvalidTransition {
                id,
                state: job.status.to_string(),
                target: target.to_string(),
            });
        }

        job.status = target;
        apply(job);
        Ok(())
    }
}

impl Default for JobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn create_and_get() {
        let store = JobStore::new();
        let id = store.create("echo", json!({"x": 1})).await;

        let job = store.get(id).await.expect("job should exist");
        assert_eq!(job.id, id);
        assert_eq!(job.task, "echo");
        assert_eq!(job.status, JobStatus::Scheduled);
        assert_eq!(job.payload, json!({"x": 1}));
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = JobStore::new();
        assert!(store.get(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let store = JobStore::new();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..100 {
            let id = store.create("echo", json!({})).await;
            assert!(seen.insert(id), "duplicate job id");
        }
    }

    #[tokio::test]
    async fn full_lifecycle() {
        let store = JobStore::new();
        let id = store.create("echo", json!({})).await;

        store.mark_running(id).await.unwrap();
        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Running);
        assert!(job.started_at.is_some());
        assert!(job.finished_at.is_none());

        store.mark_done(id, json!({"ok": true})).await.unwrap();
        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Done);
        assert!(job.finished_at.is_some());
        assert_eq!(job.result, Some(json!({"ok": true})));
        assert!(job.error.is_none());
    }

    #[tokio::test]
    async fn error_lifecycle() {
        let store = JobStore::new();
        let id = store.create("boom", json!({})).await;

        store.mark_running(id).await.unwrap();
        store.mark_error(id, "kaboom").await.unwrap();

        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Error);
        assert_eq!(job.error.as_deref(), Some("kaboom"));
        assert!(job.result.is_none());
    }

    #[tokio::test]
    async fn terminal_states_are_final() {
        let store = JobStore::new();
        let id = store.create("echo", json!({})).await;
        store.mark_running(id).await.unwrap();
        store.mark_done(id, json!(null)).await.unwrap();

        assert!(matches!(
            store.mark_error(id, "late failure").await,
            Err(JobError::InvalidTransition { .. })
        ));
        assert!(matches!(
            store.mark_running(id).await,
            Err(JobError::InvalidTransition { .. })
        ));

        // Terminal snapshot is unchanged by the rejected transitions.
        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Done);
        assert!(job.error.is_none());
    }

    #[tokio::test]
    async fn cannot_skip_running() {
        let store = JobStore::new();
        let id = store.create("echo", json!({})).await;
        assert!(matches!(
            store.mark_done(id, json!(null)).await,
            Err(JobError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn mark_missing_job_is_not_found() {
        let store = JobStore::new();
        assert!(matches!(
            store.mark_running(Uuid::new_v4()).await,
            Err(JobError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn list_newest_first() {
        let store = JobStore::new();
        let a = store.create("echo", json!({"n": 0})).await;
        let b = store.create("echo", json!({"n": 1})).await;
        let c = store.create("echo", json!({"n": 2})).await;

        let jobs = store.list().await;
        let ids: Vec<Uuid> = jobs.iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![c, b, a]);
    }

    #[tokio::test]
    async fn snapshots_are_stable_after_terminal() {
        let store = JobStore::new();
        let id = store.create("echo", json!({})).await;
        store.mark_running(id).await.unwrap();
        store.mark_done(id, json!({"v": 1})).await.unwrap();

        let first = store.get(id).await.unwrap();
        let second = store.get(id).await.unwrap();
        assert_eq!(first.status, second.status);
        assert_eq!(first.result, second.result);
        assert_eq!(first.started_at, second.started_at);
        assert_eq!(first.finished_at, second.finished_at);
    }

    #[tokio::test]
    async fn mutating_a_snapshot_does_not_touch_the_store() {
        let store = JobStore::new();
        let id = store.create("echo", json!({})).await;

        let mut snapshot = store.get(id).await.unwrap();
        snapshot.status = JobStatus::Done;
        snapshot.error = Some("tampered".into());

        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Scheduled);
        assert!(job.error.is_none());
    }

    #[tokio::test]
    async fn reset_clears_everything() {
        let store = JobStore::new();
        store.create("echo", json!({})).await;
        store.create("echo", json!({})).await;
        assert_eq!(store.len().await, 2);

        store.reset().await;
        assert!(store.is_empty().await);
        assert!(store.list().await.is_empty());
    }

    #[tokio::test]
    async fn concurrent_creates_do_not_corrupt() {
        let store = std::sync::Arc::new(JobStore::new());
        let mut handles = Vec::new();
        for i in 0..50 {
            let store = std::sync::Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.create("echo", json!({"n": i})).await
            }));
        }

        let mut ids = std::collections::HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap());
        }
        assert_eq!(ids.len(), 50);
        assert_eq!(store.len().await, 50);
        assert_eq!(store.list().await.len(), 50);
    }
}
