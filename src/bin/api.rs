use archiver::api::{ApiContext, handler};
use archiver::core::config::AppConfig;
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use serde_json::Value;
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    archiver::setup_logging();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e.to_string())
    })?;
    let ctx = ApiContext::from_config(config).await;
    let ctx = &ctx;

    run(service_fn(move |event: LambdaEvent<Value>| async move {
        handler(ctx, event).await
    }))
    .await
}
