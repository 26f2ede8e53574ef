//! HTTP API client.
//!
//! [`TaskApi`] is the seam the controller depends on; [`HttpApi`] is the
//! reqwest implementation speaking the server's envelope shapes. The client
//! does not retry failed requests; the controller's rollback protocol is
//! the recovery mechanism.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use taskboard_core::{Task, TaskId, TaskPatch, TaskStats};

use crate::error::ClientError;

/// What the optimistic controller needs from the server.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Task>, ClientError>;
    async fn create(&self, description: &str) -> Result<Task, ClientError>;
    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, ClientError>;
    async fn toggle(&self, id: TaskId) -> Result<Task, ClientError>;
    async fn delete(&self, id: TaskId) -> Result<(), ClientError>;
    async fn stats(&self) -> Result<TaskStats, ClientError>;
}

#[async_trait]
impl<T: TaskApi + ?Sized> TaskApi for std::sync::Arc<T> {
    async fn list(&self) -> Result<Vec<Task>, ClientError> {
        (**self).list().await
    }

    async fn create(&self, description: &str) -> Result<Task, ClientError> {
        (**self).create(description).await
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, ClientError> {
        (**self).update(id, patch).await
    }

    async fn toggle(&self, id: TaskId) -> Result<Task, ClientError> {
        (**self).toggle(id).await
    }

    async fn delete(&self, id: TaskId) -> Result<(), ClientError> {
        (**self).delete(id).await
    }

    async fn stats(&self) -> Result<TaskStats, ClientError> {
        (**self).stats().await
    }
}

/// Default timeout for API requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-backed [`TaskApi`] implementation.
///
/// Uses reqwest's built-in connection pooling; the client is cheap to clone
/// and safe to share.
#[derive(Clone)]
pub struct HttpApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpApi {
    /// Create a client for a server base URL, e.g. `http://localhost:3000`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Send a request and unwrap the success envelope's `data` field.
    ///
    /// Error statuses are decoded from the server's error envelope so the
    /// stable error code survives into [`ClientError::Api`].
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::Null);

        if !status.is_success() {
            return Err(ClientError::from_envelope(status.as_u16(), &body));
        }

        let data = body.get("data").cloned().unwrap_or(body);
        Ok(serde_json::from_value(data)?)
    }
}

#[async_trait]
impl TaskApi for HttpApi {
    async fn list(&self) -> Result<Vec<Task>, ClientError> {
        self.execute(self.http.get(self.url("/todos"))).await
    }

    async fn create(&self, description: &str) -> Result<Task, ClientError> {
        self.execute(
            self.http
                .post(self.url("/todos"))
                .json(&serde_json::json!({ "description": description })),
        )
        .await
    }

    async fn update(&self, id: TaskId, patch: &TaskPatch) -> Result<Task, ClientError> {
        self.execute(
            self.http
                .put(self.url(&format!("/todos/{id}")))
                .json(patch),
        )
        .await
    }

    async fn toggle(&self, id: TaskId) -> Result<Task, ClientError> {
        self.execute(self.http.patch(self.url(&format!("/todos/{id}/toggle"))))
            .await
    }

    async fn delete(&self, id: TaskId) -> Result<(), ClientError> {
        // The delete envelope carries only a confirmation message.
        let _: Value = self
            .execute(self.http.delete(self.url(&format!("/todos/{id}"))))
            .await?;
        Ok(())
    }

    async fn stats(&self) -> Result<TaskStats, ClientError> {
        self.execute(self.http.get(self.url("/todos/stats"))).await
    }
}
