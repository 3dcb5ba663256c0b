#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use tokio::sync::oneshot;

use taskdash::error::RemoteError;
use taskdash::models::{
    NewTask, Profile, ProfilePatch, Session, Task, TaskPatch, TaskPriority, TaskStatus,
};
use taskdash::remote::CollectionClient;

pub const USER: &str = "user-1";

pub fn session() -> Session {
    Session::new(USER, "token-1")
}

pub fn task(id: &str, title: &str, status: TaskStatus, priority: TaskPriority) -> Task {
    let at = Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap();
    Task {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        status,
        priority,
        due_date: None,
        created_at: at,
        updated_at: at,
        user_id: USER.to_string(),
    }
}

/// Polls `check` until it holds or a second passes.
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

/// Serves queued listings, each held back until its gate opens.
#[derive(Default)]
pub struct GatedClient {
    listings: Mutex<VecDeque<(oneshot::Receiver<()>, Result<Vec<Task>, RemoteError>)>>,
}

impl GatedClient {
    pub fn queue(&self, listing: Result<Vec<Task>, RemoteError>) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.listings.lock().unwrap().push_back((rx, listing));
        tx
    }
}

#[async_trait]
impl CollectionClient for GatedClient {
    async fn list_tasks(&self, _session: &Session) -> Result<Vec<Task>, RemoteError> {
        let next = self.listings.lock().unwrap().pop_front();
        let (gate, listing) = next.expect("no listing queued");
        let _ = gate.await;
        listing
    }

    async fn create_task(&self, _session: &Session, _task: &NewTask) -> Result<Task, RemoteError> {
        Err(RemoteError::new("read only"))
    }

    async fn update_task(
        &self,
        _session: &Session,
        _id: &str,
        _patch: &TaskPatch,
    ) -> Result<Task, RemoteError> {
        Err(RemoteError::new("read only"))
    }

    async fn delete_task(&self, _session: &Session, _id: &str) -> Result<(), RemoteError> {
        Err(RemoteError::new("read only"))
    }

    async fn get_profile(&self, _session: &Session) -> Result<Profile, RemoteError> {
        Err(RemoteError::new("read only"))
    }

    async fn update_profile(
        &self,
        _session: &Session,
        _patch: &ProfilePatch,
    ) -> Result<(), RemoteError> {
        Err(RemoteError::new("read only"))
    }

    async fn sign_out(&self, _session: &Session) -> Result<(), RemoteError> {
        Ok(())
    }
}
