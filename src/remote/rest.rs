use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;

use super::{dto, CollectionClient};
use crate::error::{AppError, RemoteError};
use crate::models::{NewTask, Profile, ProfilePatch, Session, Task, TaskPatch};

#[derive(Clone, Debug)]
pub struct RestConfig {
    pub base_url: String,
    pub api_key: String,
}

impl RestConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }
}

/// Talks to the hosted backend's REST data API (`/rest/v1`) and its auth
/// API (`/auth/v1`).
pub struct RestCollectionClient {
    client: Client,
    config: RestConfig,
}

impl RestCollectionClient {
    pub fn new(config: RestConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, RemoteError> {
        let mut url = Url::parse(&format!("{}{}", self.config.base_url, path))
            .map_err(|e| RemoteError::new(format!("Invalid backend url: {}", e)))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder, session: &Session) -> RequestBuilder {
        // Anonymous sessions fall back to the public key as bearer.
        let token = if session.access_token.is_empty() {
            &self.config.api_key
        } else {
            &session.access_token
        };
        request
            .header("apikey", &self.config.api_key)
            .header("Authorization", format!("Bearer {}", token))
    }

    async fn send(&self, request: RequestBuilder, session: &Session) -> Result<Response, RemoteError> {
        let response = self.authorized(request, session).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<dto::ErrorBody>(&body)
                .ok()
                .and_then(dto::ErrorBody::into_message)
                .unwrap_or_else(|| format!("Backend error {}: {}", status, body));
            tracing::warn!("backend request failed with {}: {}", status, message);
            return Err(RemoteError::new(message));
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        session: &Session,
    ) -> Result<T, RemoteError> {
        let response = self.send(request, session).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| RemoteError::new(format!("Failed to parse backend response: {}", e)))
    }
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

#[async_trait]
impl CollectionClient for RestCollectionClient {
    async fn list_tasks(&self, session: &Session) -> Result<Vec<Task>, RemoteError> {
        let url = self.url(
            "/rest/v1/tasks",
            &[
                ("select", "*".to_string()),
                ("user_id", eq(&session.user_id)),
                ("order", "created_at.desc".to_string()),
            ],
        )?;
        self.send_json(self.client.get(url), session).await
    }

    async fn create_task(&self, session: &Session, task: &NewTask) -> Result<Task, RemoteError> {
        let url = self.url("/rest/v1/tasks", &[])?;
        let request = self
            .client
            .post(url)
            .header("Prefer", "return=representation")
            .json(task);

        let rows: Vec<Task> = self.send_json(request, session).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RemoteError::new("Backend returned no row for the new task"))
    }

    async fn update_task(
        &self,
        session: &Session,
        id: &str,
        patch: &TaskPatch,
    ) -> Result<Task, RemoteError> {
        let url = self.url("/rest/v1/tasks", &[("id", eq(id))])?;
        let request = self
            .client
            .patch(url)
            .header("Prefer", "return=representation")
            .json(patch);

        let rows: Vec<Task> = self.send_json(request, session).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RemoteError::new(format!("Task {} not found", id)))
    }

    async fn delete_task(&self, session: &Session, id: &str) -> Result<(), RemoteError> {
        let url = self.url("/rest/v1/tasks", &[("id", eq(id))])?;
        self.send(self.client.delete(url), session).await?;
        Ok(())
    }

    async fn get_profile(&self, session: &Session) -> Result<Profile, RemoteError> {
        let url = self.url(
            "/rest/v1/profiles",
            &[("select", "*".to_string()), ("id", eq(&session.user_id))],
        )?;
        let rows: Vec<Profile> = self.send_json(self.client.get(url), session).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RemoteError::new("Profile not found"))
    }

    async fn update_profile(
        &self,
        session: &Session,
        patch: &ProfilePatch,
    ) -> Result<(), RemoteError> {
        let url = self.url("/rest/v1/profiles", &[("id", eq(&session.user_id))])?;
        self.send(self.client.patch(url).json(patch), session).await?;
        Ok(())
    }

    async fn sign_out(&self, session: &Session) -> Result<(), RemoteError> {
        let url = self.url("/auth/v1/logout", &[])?;
        self.send(self.client.post(url), session).await?;
        Ok(())
    }
}
