mod common;

use std::sync::Arc;

use taskdash::forms::{ProfileForm, TaskForm};
use taskdash::models::{Profile, TaskPriority, TaskStatus};
use taskdash::remote::MemoryCollectionClient;
use taskdash::services::{Dashboard, PLACEHOLDER_NAME};

use common::{session, task, USER};

fn dashboard() -> (Arc<MemoryCollectionClient>, Dashboard) {
    let client = Arc::new(MemoryCollectionClient::new());
    let dashboard = Dashboard::new(session(), client.clone());
    (client, dashboard)
}

fn ada() -> Profile {
    Profile {
        id: USER.to_string(),
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        email: "ada@example.com".to_string(),
    }
}

#[tokio::test]
async fn task_form_create_then_edit() {
    let (client, dashboard) = dashboard();

    let mut form = TaskForm::new();
    form.open_for_create();
    form.set_title("Ship");
    form.set_description("release notes");
    form.set_due_date("2026-11-02");
    dashboard.submit_task_form(&form).await.unwrap().unwrap();
    form.close();

    let created = dashboard.tasks().snapshot()[0].clone();
    assert_eq!(created.title, "Ship");
    assert_eq!(created.user_id, USER);
    assert_eq!(created.due_date.map(|d| d.to_string()).as_deref(), Some("2026-11-02"));

    form.open_for_edit(&created);
    form.set_status(TaskStatus::InProgress);
    form.set_due_date("");
    dashboard.submit_task_form(&form).await.unwrap().unwrap();

    let edited = dashboard.tasks().get(&created.id).unwrap();
    assert_eq!(edited.status, TaskStatus::InProgress);
    assert_eq!(edited.due_date, None);
    assert_eq!(client.rows().len(), 1);
}

#[tokio::test]
async fn blank_title_never_reaches_backend() {
    let (client, dashboard) = dashboard();

    let mut form = TaskForm::new();
    form.open_for_create();
    form.set_description("no title here");

    assert!(dashboard.submit_task_form(&form).await.is_none());
    assert!(client.rows().is_empty());
    assert!(dashboard.notifier().pending().is_empty());
}

#[tokio::test]
async fn set_status_and_delete() {
    let (client, dashboard) = dashboard();
    client.insert_row(task("1", "Write spec", TaskStatus::Pending, TaskPriority::High));
    dashboard.load().await;

    dashboard.set_status("1", TaskStatus::Completed).await.unwrap();
    assert_eq!(dashboard.tasks().stats().completed, 1);

    dashboard.delete_task("1").await.unwrap();
    assert_eq!(dashboard.tasks().stats().total, 0);
}

#[tokio::test]
async fn profile_load_failure_is_silent() {
    let (client, dashboard) = dashboard();
    client.fail_next("profiles unavailable");

    assert!(dashboard.profile().load(dashboard.session()).await.is_none());
    assert_eq!(dashboard.profile().display_name(), PLACEHOLDER_NAME);
    assert!(dashboard.notifier().errors().is_empty());
}

#[tokio::test]
async fn profile_form_round_trip() {
    let (client, dashboard) = dashboard();
    client.put_profile(ada());
    dashboard.load().await;
    assert_eq!(dashboard.profile().display_name(), "Ada Lovelace");

    let mut form = ProfileForm::new();
    form.open(dashboard.profile().current().as_ref());
    form.fields.last_name = "King".to_string();
    dashboard.submit_profile_form(&form).await.unwrap();

    assert_eq!(dashboard.profile().current().unwrap().last_name, "King");
    assert_eq!(dashboard.profile().display_name(), "Ada King");
}

#[tokio::test]
async fn profile_update_failure_is_notified() {
    let (client, dashboard) = dashboard();
    client.put_profile(ada());
    dashboard.load().await;

    client.fail_next("email already taken");
    let mut form = ProfileForm::new();
    form.open(dashboard.profile().current().as_ref());
    form.fields.email = "taken@example.com".to_string();

    assert!(dashboard.submit_profile_form(&form).await.is_err());
    assert_eq!(dashboard.profile().current().unwrap().email, "ada@example.com");
    assert_eq!(dashboard.notifier().errors()[0].message, "email already taken");
}

#[tokio::test]
async fn sign_out_failure_is_notified() {
    let (client, dashboard) = dashboard();
    client.fail_next("session expired");

    assert!(dashboard.sign_out().await.is_err());
    assert_eq!(dashboard.notifier().errors().len(), 1);
    assert!(dashboard.sign_out().await.is_ok());
}

#[tokio::test]
async fn notices_are_dismissible() {
    let (client, dashboard) = dashboard();
    client.fail_next("boom");
    let _ = dashboard.refresh().await;

    let notifier = dashboard.notifier();
    let id = notifier.errors()[0].id;
    assert!(notifier.dismiss(id));
    assert!(!notifier.dismiss(id));
    assert!(notifier.pending().is_empty());
}
