use axum::Json;
use axum::extract::{Path, Query};
use axum::routing::{delete, get, patch, post};
use axum::{Router, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::forms::{ProfileFields, ProfileForm, TaskFields, TaskFieldsUpdate, TaskForm};
use crate::models::*;
use crate::notify::Notice;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
struct TaskQueryParams {
    #[serde(default)]
    search: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    priority: String,
}

impl TaskQueryParams {
    fn into_query(self) -> Result<TaskQuery, AppError> {
        let status = self.status.parse::<Filter<TaskStatus>>().map_err(AppError::BadRequest)?;
        let priority = self
            .priority
            .parse::<Filter<TaskPriority>>()
            .map_err(AppError::BadRequest)?;
        Ok(TaskQuery::new(self.search, status, priority))
    }
}

#[derive(Debug, Serialize)]
struct TasksResponse {
    tasks: Vec<Task>,
    loading: bool,
}

#[derive(Debug, Serialize)]
struct ProfileResponse {
    profile: Option<Profile>,
    display_name: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/stats", get(task_stats))
        .route("/tasks/refresh", post(refresh_tasks))
        .route("/tasks/{id}", patch(update_task).delete(delete_task))
        .route("/profile", get(get_profile).patch(update_profile))
        .route("/notifications", get(list_notifications))
        .route("/notifications/{id}", delete(dismiss_notification))
        .route("/sign-out", post(sign_out))
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<TaskQueryParams>,
) -> Result<Json<TasksResponse>, AppError> {
    let query = params.into_query()?;
    let tasks = state.dashboard.tasks();
    Ok(Json(TasksResponse {
        tasks: tasks.filter(&query),
        loading: tasks.is_loading(),
    }))
}

async fn task_stats(State(state): State<AppState>) -> Json<TaskStats> {
    Json(state.dashboard.tasks().stats())
}

async fn refresh_tasks(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.dashboard.refresh().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn create_task(
    State(state): State<AppState>,
    Json(fields): Json<TaskFields>,
) -> Result<StatusCode, AppError> {
    let mut form = TaskForm::new();
    form.open_for_create();
    form.fields = fields;
    submit(&state, &form).await?;
    Ok(StatusCode::CREATED)
}

async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<TaskFieldsUpdate>,
) -> Result<StatusCode, AppError> {
    let task = state.dashboard.tasks().get(&id).ok_or(AppError::NotFound)?;
    if let Some(status) = update.status_only() {
        state.dashboard.set_status(&task.id, status).await?;
        return Ok(StatusCode::NO_CONTENT);
    }

    let mut form = TaskForm::new();
    form.open_for_edit(&task);
    update.apply_to(&mut form.fields);
    submit(&state, &form).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn submit(state: &AppState, form: &TaskForm) -> Result<(), AppError> {
    match state.dashboard.submit_task_form(form).await {
        Some(result) => Ok(result?),
        None => Err(AppError::Unprocessable(
            "task needs a title and a YYYY-MM-DD due date or none".to_string(),
        )),
    }
}

async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.dashboard.delete_task(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_profile(State(state): State<AppState>) -> Json<ProfileResponse> {
    let profile = state.dashboard.profile();
    Json(ProfileResponse {
        profile: profile.current(),
        display_name: profile.display_name(),
    })
}

async fn update_profile(
    State(state): State<AppState>,
    Json(fields): Json<ProfileFields>,
) -> Result<StatusCode, AppError> {
    let mut form = ProfileForm::new();
    form.open(state.dashboard.profile().current().as_ref());
    form.fields = fields;
    state.dashboard.submit_profile_form(&form).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_notifications(State(state): State<AppState>) -> Json<Vec<Notice>> {
    Json(state.dashboard.notifier().pending())
}

async fn dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    if state.dashboard.notifier().dismiss(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}

async fn sign_out(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.dashboard.sign_out().await?;
    Ok(StatusCode::NO_CONTENT)
}
