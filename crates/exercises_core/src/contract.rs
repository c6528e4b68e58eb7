use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HandlerError;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Host-supplied metadata for a single invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvocationContext {
    pub request_id: String,
    pub function_name: String,
    /// Deadline as epoch milliseconds.
    pub deadline_ms: u64,
}

impl InvocationContext {
    /// Context for invocations that do not come from a hosting runtime.
    pub fn local() -> Self {
        Self {
            request_id: "local-request".to_string(),
            function_name: "local-function".to_string(),
            deadline_ms: u64::MAX,
        }
    }

    pub fn remaining(&self, now_ms: u64) -> Duration {
        Duration::from_millis(self.deadline_ms.saturating_sub(now_ms))
    }
}

/// Response shape expected by an API Gateway proxy integration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ApiGatewayResponse {
    pub fn json(status_code: u16, body: impl Into<String>) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string());
        Self {
            status_code,
            headers,
            body: body.into(),
        }
    }

    pub fn into_value(self) -> Result<Value, HandlerError> {
        Ok(serde_json::to_value(self)?)
    }
}

/// The single calling convention shared by every exercise.
///
/// A hosting runtime hands over the raw event and an [`InvocationContext`];
/// the handler answers with any JSON value or fails with a [`HandlerError`],
/// which the runtime reports as an invocation error.
#[async_trait]
pub trait Handler: Send + Sync {
    fn name(&self) -> &'static str;

    async fn invoke(
        &self,
        event: Value,
        context: &InvocationContext,
    ) -> Result<Value, HandlerError>;
}
