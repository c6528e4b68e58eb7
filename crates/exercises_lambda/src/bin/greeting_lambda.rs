use exercises_core::greeting::GreetingHandler;
use exercises_lambda::runtime::serve;
use lambda_runtime::Error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::tracing::init_default_subscriber();
    serve(GreetingHandler).await
}
