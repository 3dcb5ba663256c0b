use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::RemoteError;
use crate::feed::ChangeFeed;
use crate::forms::{ProfileForm, TaskForm, TaskSubmission};
use crate::models::{Session, TaskPatch, TaskStatus};
use crate::notify::Notifier;
use crate::remote::CollectionClient;
use crate::services::{ProfileView, TaskList};

/// Everything one signed-in user sees: their tasks, their profile and the
/// notice board, plus the change-feed listener keeping the tasks fresh.
pub struct Dashboard {
    session: Session,
    client: Arc<dyn CollectionClient>,
    tasks: Arc<TaskList>,
    profile: ProfileView,
    notifier: Notifier,
    watcher: Mutex<Option<JoinHandle<()>>>,
}

impl Dashboard {
    pub fn new(session: Session, client: Arc<dyn CollectionClient>) -> Self {
        let notifier = Notifier::new();
        Self {
            tasks: Arc::new(TaskList::new(client.clone(), notifier.clone())),
            profile: ProfileView::new(client.clone(), notifier.clone()),
            session,
            client,
            notifier,
            watcher: Mutex::new(None),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn tasks(&self) -> &TaskList {
        &self.tasks
    }

    pub fn profile(&self) -> &ProfileView {
        &self.profile
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Initial load: tasks and profile.
    pub async fn load(&self) {
        let _ = self.tasks.refresh(&self.session).await;
        self.profile.load(&self.session).await;
    }

    /// Subscribes to `feed` and refreshes on every signal. Replaces any
    /// earlier subscription. Must be called from within a Tokio runtime.
    pub fn watch(&self, feed: &dyn ChangeFeed) {
        let mut subscription = feed.subscribe(&self.session);
        let tasks = self.tasks.clone();
        let session = self.session.clone();

        let handle = tokio::spawn(async move {
            while subscription.next().await.is_some() {
                let _ = tasks.on_remote_change(&session).await;
            }
            debug!("change feed for {} closed", session.user_id);
        });

        if let Some(previous) = self.watcher.lock().replace(handle) {
            previous.abort();
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watcher
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Ends the listener; its subscription is released once the task is gone.
    pub async fn unwatch(&self) {
        let handle = self.watcher.lock().take();
        if let Some(handle) = handle {
            handle.abort();
            let _ = handle.await;
        }
    }

    /// `None` when the form suppressed the submission.
    pub async fn submit_task_form(&self, form: &TaskForm) -> Option<Result<(), RemoteError>> {
        let result = match form.submission()? {
            TaskSubmission::Create(draft) => self.tasks.create(&self.session, draft).await,
            TaskSubmission::Update { id, patch } => {
                self.tasks.update(&self.session, &id, &patch).await
            }
        };
        Some(result)
    }

    pub async fn set_status(&self, id: &str, status: TaskStatus) -> Result<(), RemoteError> {
        debug!("moving task {} to {}", id, status);
        self.tasks
            .update(&self.session, id, &TaskPatch::status(status))
            .await
    }

    pub async fn delete_task(&self, id: &str) -> Result<(), RemoteError> {
        self.tasks.remove(&self.session, id).await
    }

    pub async fn refresh(&self) -> Result<(), RemoteError> {
        self.tasks.refresh(&self.session).await
    }

    pub async fn submit_profile_form(&self, form: &ProfileForm) -> Result<(), RemoteError> {
        self.profile.update(&self.session, &form.patch()).await
    }

    /// Stops listening for changes, then signs out with the backend.
    pub async fn sign_out(&self) -> Result<(), RemoteError> {
        self.unwatch().await;
        match self.client.sign_out(&self.session).await {
            Ok(()) => {
                info!("{} signed out", self.session.user_id);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("sign out failed: {}", e);
                self.notifier.error(e.message.clone());
                Err(e)
            }
        }
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        if let Some(handle) = self.watcher.get_mut().take() {
            handle.abort();
        }
    }
}
