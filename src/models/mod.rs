pub mod profile;
pub mod query;
pub mod session;
pub mod task;

pub use profile::{Profile, ProfilePatch};
pub use query::{Filter, TaskQuery, TaskStats};
pub use session::Session;
pub use task::{NewTask, NewTaskDraft, Task, TaskPatch, TaskPriority, TaskStatus};
