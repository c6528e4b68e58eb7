use async_trait::async_trait;
use serde_json::Value;

use crate::contract::{ApiGatewayResponse, Handler, InvocationContext};
use crate::error::HandlerError;

pub const DEFAULT_NAME: &str = "World";

pub fn greeting_response(event: &Value) -> ApiGatewayResponse {
    let name = requested_name(event).unwrap_or(DEFAULT_NAME);
    ApiGatewayResponse::json(200, format!("Hello {name}!"))
}

/// `queryStringParameters.name`, treating empty or non-string values as absent.
fn requested_name(event: &Value) -> Option<&str> {
    event
        .get("queryStringParameters")
        .and_then(|params| params.get("name"))
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct GreetingHandler;

#[async_trait]
impl Handler for GreetingHandler {
    fn name(&self) -> &'static str {
        "greeting"
    }

    async fn invoke(
        &self,
        event: Value,
        _context: &InvocationContext,
    ) -> Result<Value, HandlerError> {
        greeting_response(&event).into_value()
    }
}
