use std::sync::Arc;

use chrono::Utc;
use exercises_core::contract::{Handler, InvocationContext};
use lambda_runtime::{service_fn, Context, Error, LambdaEvent};
use serde_json::Value;
use tracing::Instrument;

pub fn invocation_context(context: &Context) -> InvocationContext {
    InvocationContext {
        request_id: context.request_id.clone(),
        function_name: context.env_config.function_name.clone(),
        deadline_ms: context.deadline,
    }
}

/// Runs one invocation and converts handler failures into invocation errors.
pub async fn handle_event<H: Handler + ?Sized>(
    handler: &H,
    payload: Value,
    context: &InvocationContext,
) -> Result<Value, Error> {
    let now_ms = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    let remaining_ms = context.remaining(now_ms).as_millis();
    let span = tracing::info_span!(
        "invocation",
        handler = handler.name(),
        request_id = %context.request_id,
        remaining_ms = %remaining_ms
    );

    async {
        handler.invoke(payload, context).await.map_err(|error| {
            tracing::error!(
                component = "runtime",
                event = "invocation_failed",
                error_code = error.code(),
                %error,
                "handler failed"
            );
            Error::from(error)
        })
    }
    .instrument(span)
    .await
}

/// Serves `handler` for the lifetime of the process.
///
/// The handler is built once, before the first invocation, so any state it
/// owns survives across warm invocations of this process.
pub async fn serve<H: Handler + 'static>(handler: H) -> Result<(), Error> {
    let handler = Arc::new(handler);
    tracing::info!(
        component = "runtime",
        event = "serving",
        handler = handler.name(),
        "starting lambda runtime loop"
    );

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let handler = Arc::clone(&handler);
        async move {
            let context = invocation_context(&event.context);
            handle_event(handler.as_ref(), event.payload, &context).await
        }
    }))
    .await
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use exercises_core::error::{ConnectionError, HandlerError};
    use exercises_core::greeting::GreetingHandler;
    use serde_json::json;

    use super::*;

    struct RefusingHandler;

    #[async_trait]
    impl Handler for RefusingHandler {
        fn name(&self) -> &'static str {
            "refusing"
        }

        async fn invoke(
            &self,
            _event: Value,
            _context: &InvocationContext,
        ) -> Result<Value, HandlerError> {
            Err(ConnectionError::new("database unreachable").into())
        }
    }

    #[test]
    fn lambda_context_maps_onto_invocation_context() {
        let mut lambda_context = Context::default();
        lambda_context.request_id = "abc".to_string();
        lambda_context.deadline = 42;

        let context = invocation_context(&lambda_context);

        assert_eq!(context.request_id, "abc");
        assert_eq!(context.deadline_ms, 42);
        assert_eq!(
            context.function_name,
            lambda_context.env_config.function_name
        );
    }

    #[tokio::test]
    async fn successful_invocation_passes_value_through() {
        let value = handle_event(
            &GreetingHandler,
            json!({"queryStringParameters": {"name": "Ada"}}),
            &InvocationContext::local(),
        )
        .await
        .expect("greeting should succeed");

        assert_eq!(value["body"], json!("Hello Ada!"));
    }

    #[tokio::test]
    async fn handler_failure_becomes_invocation_error() {
        let error = handle_event(&RefusingHandler, Value::Null, &InvocationContext::local())
            .await
            .expect_err("refusing handler should fail");

        assert_eq!(
            error.to_string(),
            "connection could not be established: database unreachable"
        );
    }
}
