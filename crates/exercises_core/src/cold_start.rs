//! Cold-start memoization of an expensive resource.
//!
//! A [`WarmContext`] stands for one execution context: it is created during
//! the init phase of a process and reused by every invocation that process
//! serves. The first caller of [`WarmContext::connection`] builds the handle
//! through the injected [`ConnectionFactory`]; later callers get the same
//! instance back. Failed attempts are never cached.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::OnceCell;

use crate::contract::{ApiGatewayResponse, Handler, InvocationContext};
use crate::error::{ConnectionError, HandlerError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionHandle {
    pub connected: bool,
    pub connected_at: DateTime<Utc>,
}

#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    async fn connect(&self) -> Result<ConnectionHandle, ConnectionError>;
}

/// Placeholder for a database driver: always connects, optionally after a delay.
#[derive(Debug, Clone, Default)]
pub struct SimulatedConnector {
    latency: Duration,
}

impl SimulatedConnector {
    pub fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }
}

#[async_trait]
impl ConnectionFactory for SimulatedConnector {
    async fn connect(&self) -> Result<ConnectionHandle, ConnectionError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(ConnectionHandle {
            connected: true,
            connected_at: Utc::now(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvocationPhase {
    Cold,
    Warm,
}

pub struct WarmContext<F> {
    factory: F,
    connection: OnceCell<Arc<ConnectionHandle>>,
    invocations: AtomicU64,
}

impl<F: ConnectionFactory> WarmContext<F> {
    pub fn new(factory: F) -> Self {
        tracing::info!(
            component = "warm_start",
            event = "context_initialized",
            "INIT"
        );
        Self {
            factory,
            connection: OnceCell::new(),
            invocations: AtomicU64::new(0),
        }
    }

    /// Marks the start of an invocation served by this context.
    pub fn begin_invocation(&self) -> InvocationPhase {
        match self.invocations.fetch_add(1, Ordering::SeqCst) {
            0 => InvocationPhase::Cold,
            _ => InvocationPhase::Warm,
        }
    }

    pub fn invocation_count(&self) -> u64 {
        self.invocations.load(Ordering::SeqCst)
    }

    pub fn is_connected(&self) -> bool {
        self.connection.initialized()
    }

    pub async fn connection(&self) -> Result<Arc<ConnectionHandle>, ConnectionError> {
        self.connection
            .get_or_try_init(|| async {
                let handle = self.factory.connect().await.inspect_err(|error| {
                    tracing::warn!(
                        component = "warm_start",
                        event = "connection_failed",
                        %error,
                        "connection attempt failed; next caller retries"
                    );
                })?;
                tracing::info!(
                    component = "warm_start",
                    event = "connection_created",
                    connected_at = %handle.connected_at,
                    "created new database connection"
                );
                Ok::<_, ConnectionError>(Arc::new(handle))
            })
            .await
            .cloned()
    }
}

pub struct WarmStartHandler<F> {
    context: WarmContext<F>,
}

impl<F: ConnectionFactory> WarmStartHandler<F> {
    pub fn new(context: WarmContext<F>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &WarmContext<F> {
        &self.context
    }
}

#[async_trait]
impl<F: ConnectionFactory> Handler for WarmStartHandler<F> {
    fn name(&self) -> &'static str {
        "warm_start"
    }

    async fn invoke(
        &self,
        _event: Value,
        context: &InvocationContext,
    ) -> Result<Value, HandlerError> {
        let phase = self.context.begin_invocation();
        let connection = self.context.connection().await?;
        tracing::info!(
            component = "warm_start",
            event = "invocation_phase",
            request_id = %context.request_id,
            phase = ?phase,
            connected = connection.connected,
            connected_at = %connection.connected_at,
            "serving invocation"
        );

        let body = json!({ "message": "Hello, world!" }).to_string();
        ApiGatewayResponse::json(200, body).into_value()
    }
}
