//! Edit buffers behind the task and profile dialogs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{NewTaskDraft, Profile, ProfilePatch, Task, TaskPatch, TaskPriority, TaskStatus};

/// Raw task dialog fields. The due date is kept as the date input's string,
/// empty meaning "no due date".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFields {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_date: String,
}

impl From<&Task> for TaskFields {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status,
            priority: task.priority,
            due_date: task
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }
}

/// A partial edit of the task dialog. Fields left out keep whatever the
/// dialog was seeded with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskFieldsUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub due_date: Option<String>,
}

impl TaskFieldsUpdate {
    /// The new status when that is the only field being changed.
    pub fn status_only(&self) -> Option<TaskStatus> {
        match self {
            TaskFieldsUpdate {
                title: None,
                description: None,
                status: Some(status),
                priority: None,
                due_date: None,
            } => Some(*status),
            _ => None,
        }
    }

    pub fn apply_to(self, fields: &mut TaskFields) {
        if let Some(title) = self.title {
            fields.title = title;
        }
        if let Some(description) = self.description {
            fields.description = description;
        }
        if let Some(status) = self.status {
            fields.status = status;
        }
        if let Some(priority) = self.priority {
            fields.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            fields.due_date = due_date;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TaskSubmission {
    Create(NewTaskDraft),
    Update { id: String, patch: TaskPatch },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub fields: TaskFields,
    editing: Option<String>,
    open: bool,
}

impl TaskForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_for_create(&mut self) {
        self.fields = TaskFields::default();
        self.editing = None;
        self.open = true;
    }

    pub fn open_for_edit(&mut self, task: &Task) {
        self.fields = TaskFields::from(task);
        self.editing = Some(task.id.clone());
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.fields.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.fields.description = description.into();
    }

    pub fn set_status(&mut self, status: TaskStatus) {
        self.fields.status = status;
    }

    pub fn set_priority(&mut self, priority: TaskPriority) {
        self.fields.priority = priority;
    }

    pub fn set_due_date(&mut self, due_date: impl Into<String>) {
        self.fields.due_date = due_date.into();
    }

    /// What submitting the dialog sends, or `None` when submission is
    /// suppressed (blank title, or a due date that is not `YYYY-MM-DD`).
    pub fn submission(&self) -> Option<TaskSubmission> {
        if self.fields.title.trim().is_empty() {
            debug!("task form submitted without a title; ignoring");
            return None;
        }

        let due_date = parse_due_date(&self.fields.due_date)?;
        let fields = self.fields.clone();

        Some(match &self.editing {
            None => TaskSubmission::Create(NewTaskDraft {
                title: fields.title,
                description: fields.description,
                status: fields.status,
                priority: fields.priority,
                due_date,
            }),
            Some(id) => TaskSubmission::Update {
                id: id.clone(),
                patch: TaskPatch {
                    title: Some(fields.title),
                    description: Some(fields.description),
                    status: Some(fields.status),
                    priority: Some(fields.priority),
                    due_date: Some(due_date),
                },
            },
        })
    }
}

// Outer None: unparseable, suppress. Inner None: explicitly no due date.
fn parse_due_date(raw: &str) -> Option<Option<NaiveDate>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(None);
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(Some(date)),
        Err(e) => {
            warn!("ignoring task form with invalid due date {:?}: {}", raw, e);
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFields {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub fields: ProfileFields,
    open: bool,
}

impl ProfileForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, profile: Option<&Profile>) {
        self.fields = profile
            .map(|p| ProfileFields {
                first_name: p.first_name.clone(),
                last_name: p.last_name.clone(),
                email: p.email.clone(),
            })
            .unwrap_or_default();
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn patch(&self) -> ProfilePatch {
        ProfilePatch {
            first_name: Some(self.fields.first_name.clone()),
            last_name: Some(self.fields.last_name.clone()),
            email: Some(self.fields.email.clone()),
        }
    }
}
