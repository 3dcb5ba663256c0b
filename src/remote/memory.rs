use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use super::CollectionClient;
use crate::error::RemoteError;
use crate::feed::ChangeHub;
use crate::models::{NewTask, Profile, ProfilePatch, Session, Task, TaskPatch};

/// Backend kept in process memory. It behaves like the hosted one: ids and
/// timestamps are assigned here, every query is scoped to the session's
/// user, and mutations are announced on the attached [`ChangeHub`].
#[derive(Default)]
pub struct MemoryCollectionClient {
    tasks: Mutex<Vec<Task>>,
    profiles: Mutex<HashMap<String, Profile>>,
    hub: Option<ChangeHub>,
    failures: Mutex<Vec<String>>,
}

impl MemoryCollectionClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hub(mut self, hub: ChangeHub) -> Self {
        self.hub = Some(hub);
        self
    }

    /// Stores a row as if another client had written it. Newest rows come
    /// first, matching the listing order.
    pub fn insert_row(&self, task: Task) {
        let user_id = task.user_id.clone();
        self.tasks.lock().insert(0, task);
        self.announce(&user_id);
    }

    pub fn put_profile(&self, profile: Profile) {
        self.profiles.lock().insert(profile.id.clone(), profile);
    }

    /// The next call, whatever it is, fails with `message`.
    pub fn fail_next(&self, message: impl Into<String>) {
        self.failures.lock().push(message.into());
    }

    pub fn rows(&self) -> Vec<Task> {
        self.tasks.lock().clone()
    }

    fn check_failure(&self) -> Result<(), RemoteError> {
        let mut failures = self.failures.lock();
        if failures.is_empty() {
            Ok(())
        } else {
            Err(RemoteError::new(failures.remove(0)))
        }
    }

    fn announce(&self, user_id: &str) {
        if let Some(hub) = &self.hub {
            hub.notify(user_id);
        }
    }
}

#[async_trait]
impl CollectionClient for MemoryCollectionClient {
    async fn list_tasks(&self, session: &Session) -> Result<Vec<Task>, RemoteError> {
        self.check_failure()?;
        Ok(self
            .tasks
            .lock()
            .iter()
            .filter(|t| t.user_id == session.user_id)
            .cloned()
            .collect())
    }

    async fn create_task(&self, session: &Session, task: &NewTask) -> Result<Task, RemoteError> {
        self.check_failure()?;
        if task.user_id != session.user_id {
            return Err(RemoteError::new("new row violates row-level security policy"));
        }

        let now = Utc::now();
        let created = Task {
            id: Uuid::new_v4().to_string(),
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
            due_date: task.due_date,
            created_at: now,
            updated_at: now,
            user_id: task.user_id.clone(),
        };
        self.tasks.lock().insert(0, created.clone());
        self.announce(&session.user_id);
        Ok(created)
    }

    async fn update_task(
        &self,
        session: &Session,
        id: &str,
        patch: &TaskPatch,
    ) -> Result<Task, RemoteError> {
        self.check_failure()?;
        let updated = {
            let mut tasks = self.tasks.lock();
            let task = tasks
                .iter_mut()
                .find(|t| t.id == id && t.user_id == session.user_id)
                .ok_or_else(|| RemoteError::new(format!("Task {} not found", id)))?;
            patch.apply_to(task);
            task.updated_at = Utc::now();
            task.clone()
        };
        self.announce(&session.user_id);
        Ok(updated)
    }

    async fn delete_task(&self, session: &Session, id: &str) -> Result<(), RemoteError> {
        self.check_failure()?;
        let removed = {
            let mut tasks = self.tasks.lock();
            let before = tasks.len();
            tasks.retain(|t| !(t.id == id && t.user_id == session.user_id));
            before != tasks.len()
        };
        // Deleting a missing row is not an error for the hosted backend either.
        if removed {
            self.announce(&session.user_id);
        }
        Ok(())
    }

    async fn get_profile(&self, session: &Session) -> Result<Profile, RemoteError> {
        self.check_failure()?;
        self.profiles
            .lock()
            .get(&session.user_id)
            .cloned()
            .ok_or_else(|| RemoteError::new("Profile not found"))
    }

    async fn update_profile(
        &self,
        session: &Session,
        patch: &ProfilePatch,
    ) -> Result<(), RemoteError> {
        self.check_failure()?;
        let mut profiles = self.profiles.lock();
        let profile = profiles
            .entry(session.user_id.clone())
            .or_insert_with(|| Profile {
                id: session.user_id.clone(),
                ..Profile::default()
            });
        patch.apply_to(profile);
        Ok(())
    }

    async fn sign_out(&self, _session: &Session) -> Result<(), RemoteError> {
        self.check_failure()
    }
}
