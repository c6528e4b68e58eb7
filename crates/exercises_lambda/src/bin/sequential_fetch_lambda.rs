use exercises_core::fetch::{HttpTodoSource, SequentialFetchHandler};
use exercises_lambda::config::RuntimeConfig;
use exercises_lambda::runtime::serve;
use lambda_runtime::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::tracing::init_default_subscriber();
    let config = RuntimeConfig::from_env()?;
    let source = HttpTodoSource::new(config.todo_endpoint_url, config.todo_request_timeout)?;
    serve(SequentialFetchHandler::new(source)).await
}
