use exercises_core::scheduling::{SchedulingDemo, SchedulingHandler};
use exercises_lambda::config::RuntimeConfig;
use exercises_lambda::runtime::serve;
use lambda_runtime::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::tracing::init_default_subscriber();
    let config = RuntimeConfig::from_env()?;
    let demo = SchedulingDemo::new(config.scheduling);
    serve(SchedulingHandler::new(demo)).await
}
