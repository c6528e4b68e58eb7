use exercises_core::cold_start::{SimulatedConnector, WarmContext, WarmStartHandler};
use exercises_lambda::config::RuntimeConfig;
use exercises_lambda::runtime::serve;
use lambda_runtime::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::tracing::init_default_subscriber();
    let config = RuntimeConfig::from_env()?;

    // Init phase: the context, and any connection it caches, lives as long
    // as this process keeps serving warm invocations.
    let context = WarmContext::new(SimulatedConnector::with_latency(config.connect_latency));
    serve(WarmStartHandler::new(context)).await
}
