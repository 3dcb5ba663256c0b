mod common;

use std::sync::{Arc, Mutex};

use axum::extract::{RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use taskdash::models::{NewTaskDraft, ProfilePatch, TaskPatch, TaskPriority, TaskStatus};
use taskdash::remote::{CollectionClient, RestCollectionClient, RestConfig};

use common::{session, USER};

#[derive(Clone, Default)]
struct Recorded {
    requests: Arc<Mutex<Vec<(String, Option<String>, Option<String>, Option<String>)>>>,
}

impl Recorded {
    fn log(&self, route: &str, query: Option<String>, headers: &HeaderMap) {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
        self.requests.lock().unwrap().push((
            route.to_string(),
            query,
            header("apikey"),
            header("authorization"),
        ));
    }
}

fn row(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": null,
        "status": "in_progress",
        "priority": "high",
        "due_date": "2026-02-14",
        "created_at": "2026-01-01T09:00:00.123456+00:00",
        "updated_at": "2026-01-02T09:00:00+00:00",
        "user_id": USER,
    })
}

async fn list_tasks(
    State(rec): State<Recorded>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Json<Value> {
    rec.log("GET tasks", query, &headers);
    Json(json!([row("a", "First"), row("b", "Second")]))
}

async fn create_task(
    State(rec): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    rec.log("POST tasks", Some(body.to_string()), &headers);
    let mut created = row("server-id", body["title"].as_str().unwrap_or_default());
    created["status"] = body["status"].clone();
    (StatusCode::CREATED, Json(json!([created])))
}

async fn patch_task(State(rec): State<Recorded>, RawQuery(query): RawQuery, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    rec.log("PATCH tasks", query, &headers);
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "code": "22P02", "message": "invalid input value for enum task_status" })),
    )
}

async fn delete_task(State(rec): State<Recorded>, RawQuery(query): RawQuery, headers: HeaderMap) -> StatusCode {
    rec.log("DELETE tasks", query, &headers);
    StatusCode::NO_CONTENT
}

async fn list_profiles(State(rec): State<Recorded>, RawQuery(query): RawQuery, headers: HeaderMap) -> Json<Value> {
    rec.log("GET profiles", query, &headers);
    Json(json!([]))
}

async fn patch_profile(
    State(rec): State<Recorded>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    rec.log("PATCH profiles", Some(body.to_string()), &headers);
    StatusCode::NO_CONTENT
}

async fn logout(State(rec): State<Recorded>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
    rec.log("POST logout", None, &headers);
    (StatusCode::UNAUTHORIZED, Json(json!({ "msg": "invalid JWT" })))
}

async fn fake_backend() -> (String, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route(
            "/rest/v1/tasks",
            get(list_tasks).post(create_task).patch(patch_task).delete(delete_task),
        )
        .route("/rest/v1/profiles", get(list_profiles).patch(patch_profile))
        .route("/auth/v1/logout", post(logout))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/", addr), recorded)
}

fn client(base_url: &str) -> RestCollectionClient {
    RestCollectionClient::new(RestConfig::new(base_url, "anon-key")).unwrap()
}

#[tokio::test]
async fn lists_tasks_scoped_and_ordered() {
    let (base, recorded) = fake_backend().await;
    let tasks = client(&base).list_tasks(&session()).await.unwrap();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].id, "a");
    assert_eq!(tasks[0].description, "");
    assert_eq!(tasks[0].status, TaskStatus::InProgress);
    assert_eq!(tasks[0].priority, TaskPriority::High);
    assert_eq!(tasks[0].due_date.map(|d| d.to_string()).as_deref(), Some("2026-02-14"));

    let requests = recorded.requests.lock().unwrap();
    let (_, query, apikey, auth) = &requests[0];
    let query = query.as_deref().unwrap();
    assert!(query.contains("user_id=eq.user-1"));
    assert!(query.contains("order=created_at.desc"));
    assert_eq!(apikey.as_deref(), Some("anon-key"));
    assert_eq!(auth.as_deref(), Some("Bearer token-1"));
}

#[tokio::test]
async fn creates_task_with_owner() {
    let (base, recorded) = fake_backend().await;
    let mut draft = NewTaskDraft::titled("Ship");
    draft.status = TaskStatus::Completed;
    let new_task = draft.owned_by(USER);

    let created = client(&base).create_task(&session(), &new_task).await.unwrap();
    assert_eq!(created.id, "server-id");
    assert_eq!(created.title, "Ship");
    assert_eq!(created.status, TaskStatus::Completed);

    let requests = recorded.requests.lock().unwrap();
    let body: Value = serde_json::from_str(requests[0].1.as_deref().unwrap()).unwrap();
    assert_eq!(body["user_id"], USER);
    assert_eq!(body["priority"], "medium");
    assert_eq!(body["due_date"], Value::Null);
}

#[tokio::test]
async fn backend_error_message_is_surfaced() {
    let (base, _) = fake_backend().await;
    let err = client(&base)
        .update_task(&session(), "a", &TaskPatch::status(TaskStatus::Completed))
        .await
        .unwrap_err();
    assert_eq!(err.message, "invalid input value for enum task_status");
}

#[tokio::test]
async fn deletes_by_id() {
    let (base, recorded) = fake_backend().await;
    client(&base).delete_task(&session(), "b").await.unwrap();

    let requests = recorded.requests.lock().unwrap();
    assert_eq!(requests[0].0, "DELETE tasks");
    assert_eq!(requests[0].1.as_deref(), Some("id=eq.b"));
}

#[tokio::test]
async fn missing_profile_is_an_error() {
    let (base, _) = fake_backend().await;
    let err = client(&base).get_profile(&session()).await.unwrap_err();
    assert_eq!(err.message, "Profile not found");
}

#[tokio::test]
async fn profile_patch_sends_only_set_fields() {
    let (base, recorded) = fake_backend().await;
    let patch = ProfilePatch {
        first_name: Some("Ada".to_string()),
        ..ProfilePatch::default()
    };
    client(&base).update_profile(&session(), &patch).await.unwrap();

    let requests = recorded.requests.lock().unwrap();
    let body: Value = serde_json::from_str(requests[0].1.as_deref().unwrap()).unwrap();
    assert_eq!(body, json!({ "first_name": "Ada" }));
}

#[tokio::test]
async fn auth_error_message_is_surfaced() {
    let (base, _) = fake_backend().await;
    let err = client(&base).sign_out(&session()).await.unwrap_err();
    assert_eq!(err.message, "invalid JWT");
}

#[tokio::test]
async fn unreachable_backend_is_a_remote_error() {
    let err = client("http://127.0.0.1:1").list_tasks(&session()).await.unwrap_err();
    assert!(!err.message.is_empty());
}
