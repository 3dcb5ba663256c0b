pub mod dto;
pub mod memory;
pub mod rest;

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::models::{NewTask, Profile, ProfilePatch, Session, Task, TaskPatch};

pub use memory::MemoryCollectionClient;
pub use rest::{RestCollectionClient, RestConfig};

/// The hosted backend that owns tasks and profiles. Every query is scoped
/// to the session's user by the backend itself.
#[async_trait]
pub trait CollectionClient: Send + Sync {
    async fn list_tasks(&self, session: &Session) -> Result<Vec<Task>, RemoteError>;
    async fn create_task(&self, session: &Session, task: &NewTask) -> Result<Task, RemoteError>;
    async fn update_task(
        &self,
        session: &Session,
        id: &str,
        patch: &TaskPatch,
    ) -> Result<Task, RemoteError>;
    async fn delete_task(&self, session: &Session, id: &str) -> Result<(), RemoteError>;
    async fn get_profile(&self, session: &Session) -> Result<Profile, RemoteError>;
    async fn update_profile(
        &self,
        session: &Session,
        patch: &ProfilePatch,
    ) -> Result<(), RemoteError>;
    async fn sign_out(&self, session: &Session) -> Result<(), RemoteError>;
}
