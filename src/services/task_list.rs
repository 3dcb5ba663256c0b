use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::RemoteError;
use crate::models::{NewTaskDraft, Session, Task, TaskPatch, TaskQuery, TaskStats};
use crate::notify::Notifier;
use crate::remote::CollectionClient;

/// Local mirror of the signed-in user's tasks.
///
/// Nothing is applied ahead of the backend: every successful mutation is
/// followed by a full [`TaskList::refresh`], and the local sequence is only
/// ever replaced wholesale with what a listing returned. Failed calls leave
/// it untouched. Calls are never retried.
///
/// No ordering is enforced between overlapping calls. Two refreshes in
/// flight each replace the sequence when they land, so the last response
/// wins.
///
/// Each failure is posted once to the [`Notifier`] at the point it happens.
/// The error is also returned so callers can branch on it, but it has
/// already been shown to the user.
pub struct TaskList {
    client: Arc<dyn CollectionClient>,
    notifier: Notifier,
    tasks: RwLock<Arc<Vec<Task>>>,
    in_flight: AtomicUsize,
}

struct Loading<'a>(&'a AtomicUsize);

impl<'a> Loading<'a> {
    fn begin(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl TaskList {
    pub fn new(client: Arc<dyn CollectionClient>, notifier: Notifier) -> Self {
        Self {
            client,
            notifier,
            tasks: RwLock::new(Arc::new(Vec::new())),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// The current sequence. Cheap; later refreshes do not affect it.
    pub fn snapshot(&self) -> Arc<Vec<Task>> {
        self.tasks.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<Task> {
        self.snapshot().iter().find(|t| t.id == id).cloned()
    }

    /// True while any backend call started here is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn refresh(&self, session: &Session) -> Result<(), RemoteError> {
        let result = {
            let _loading = Loading::begin(&self.in_flight);
            self.client.list_tasks(session).await
        };

        match result {
            Ok(tasks) => {
                debug!("refreshed {} task(s) for {}", tasks.len(), session.user_id);
                *self.tasks.write() = Arc::new(tasks);
                Ok(())
            }
            Err(e) => Err(self.report("load tasks", e)),
        }
    }

    pub async fn create(&self, session: &Session, draft: NewTaskDraft) -> Result<(), RemoteError> {
        let new_task = draft.owned_by(&session.user_id);
        let result = {
            let _loading = Loading::begin(&self.in_flight);
            self.client.create_task(session, &new_task).await
        };

        let created = result.map_err(|e| self.report("create task", e))?;
        info!("task {} created", created.id);
        self.notifier.success("Task created");
        self.refresh_after_write(session).await;
        Ok(())
    }

    pub async fn update(
        &self,
        session: &Session,
        id: &str,
        patch: &TaskPatch,
    ) -> Result<(), RemoteError> {
        let result = {
            let _loading = Loading::begin(&self.in_flight);
            self.client.update_task(session, id, patch).await
        };

        result.map_err(|e| self.report("update task", e))?;
        info!("task {} updated", id);
        self.notifier.success("Task updated");
        self.refresh_after_write(session).await;
        Ok(())
    }

    pub async fn remove(&self, session: &Session, id: &str) -> Result<(), RemoteError> {
        let result = {
            let _loading = Loading::begin(&self.in_flight);
            self.client.delete_task(session, id).await
        };

        result.map_err(|e| self.report("delete task", e))?;
        info!("task {} deleted", id);
        self.notifier.success("Task deleted");
        self.refresh_after_write(session).await;
        Ok(())
    }

    /// Reaction to a change-feed signal. Signals are not coalesced.
    pub async fn on_remote_change(&self, session: &Session) -> Result<(), RemoteError> {
        debug!("remote change signalled for {}", session.user_id);
        self.refresh(session).await
    }

    pub fn filter(&self, query: &TaskQuery) -> Vec<Task> {
        query.apply(&self.snapshot())
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::collect(&self.snapshot())
    }

    // The write already went through; a failed re-fetch is reported by
    // `refresh` itself and does not turn the mutation into a failure.
    async fn refresh_after_write(&self, session: &Session) {
        let _ = self.refresh(session).await;
    }

    fn report(&self, action: &str, err: RemoteError) -> RemoteError {
        tracing::warn!("failed to {}: {}", action, err);
        self.notifier.error(err.message.clone());
        err
    }
}
