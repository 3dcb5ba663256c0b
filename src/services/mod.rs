pub mod dashboard;
pub mod profile;
pub mod task_list;

pub use dashboard::Dashboard;
pub use profile::{ProfileView, PLACEHOLDER_NAME};
pub use task_list::TaskList;
