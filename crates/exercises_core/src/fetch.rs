use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::contract::{Handler, InvocationContext};
use crate::error::{FetchError, HandlerError};

pub const DEFAULT_TODO_URL: &str = "https://jsonplaceholder.typicode.com/todos/1";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub completed: bool,
}

#[async_trait]
pub trait TodoSource: Send + Sync {
    async fn fetch_todo(&self) -> Result<Todo, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpTodoSource {
    client: reqwest::Client,
    url: String,
}

impl HttpTodoSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Request {
                url: url.clone(),
                source,
            })?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl TodoSource for HttpTodoSource {
    async fn fetch_todo(&self) -> Result<Todo, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: self.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        response.json().await.map_err(|source| FetchError::Decode {
            url: self.url.clone(),
            source,
        })
    }
}

/// Awaits two fetches one after the other and reports both results.
pub struct SequentialFetchHandler<S> {
    source: S,
}

impl<S: TodoSource> SequentialFetchHandler<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub async fn fetch_both(&self) -> Result<[Todo; 2], FetchError> {
        let first = self.source.fetch_todo().await?;
        tracing::debug!(
            component = "sequential_fetch",
            todo_id = first.id,
            "first fetch resolved"
        );
        let second = self.source.fetch_todo().await?;
        tracing::debug!(
            component = "sequential_fetch",
            todo_id = second.id,
            "second fetch resolved"
        );
        Ok([first, second])
    }
}

#[async_trait]
impl<S: TodoSource> Handler for SequentialFetchHandler<S> {
    fn name(&self) -> &'static str {
        "sequential_fetch"
    }

    async fn invoke(
        &self,
        _event: Value,
        _context: &InvocationContext,
    ) -> Result<Value, HandlerError> {
        let results = self.fetch_both().await?;
        Ok(json!({ "results": results }))
    }
}
