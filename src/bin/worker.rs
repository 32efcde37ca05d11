// Lambda bootstrap entry point for the Worker function

use archiver::core::config::AppConfig;
use archiver::slack::SlackClient;
use archiver::storage::S3BlobStore;
use archiver::worker::archive::ArchiveSettings;
use archiver::worker::handler::SqsEvent;
use archiver::worker::{WorkerContext, handler};
use lambda_runtime::{Error, LambdaEvent, run, service_fn};
use tracing::error;

#[tokio::main]
async fn main() -> Result<(), Error> {
    archiver::setup_logging();

    let config = AppConfig::from_env().map_err(|e| {
        error!("Config error: {}", e);
        Error::from(e.to_string())
    })?;

    let ctx = WorkerContext {
        chat: SlackClient::new(config.slack_bot_token.clone()),
        store: S3BlobStore::from_env(config.archive_bucket.clone()).await,
        settings: ArchiveSettings::from_config(&config),
    };
    let ctx = &ctx;

    run(service_fn(move |event: LambdaEvent<SqsEvent>| async move {
        handler(ctx, event).await
    }))
    .await
}
