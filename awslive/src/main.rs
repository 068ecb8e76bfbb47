//! awslive-cleanup - delete leftover test resources
//!
//! Sweeps the account for queues and topics matching the generated test name
//! pattern and deletes them. Intended to be run by hand or on a schedule
//! after test runs that may have crashed before their teardown.

use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use awslive::{cleanup, SdkSns, SdkSqs};

#[derive(Parser, Debug)]
#[command(name = "awslive-cleanup")]
#[command(about = "Delete test topics and queues that might have been left behind", long_about = None)]
struct Args {
    /// Region to work on (default is ambient AWS configuration)
    #[arg(short, long, env = "AWSLIVE_REGION")]
    region: Option<String>,

    /// Service endpoint override, e.g. a local AWS emulator
    #[arg(long, env = "AWSLIVE_ENDPOINT_URL")]
    endpoint_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "AWSLIVE_LOG_LEVEL")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // The SDK's internals are chatty at debug level; keep them at warn
    // unless RUST_LOG says otherwise.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{},aws_config=warn,aws_smithy_runtime=warn,hyper=warn",
                    args.log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = args.region.clone() {
        info!(region = %region, "using region override");
        loader = loader.region(aws_config::Region::new(region));
    }
    if let Some(endpoint_url) = args.endpoint_url.clone() {
        info!(endpoint_url = %endpoint_url, "using endpoint override");
        loader = loader.endpoint_url(endpoint_url);
    }
    let config = loader.load().await;

    let sqs = SdkSqs::new(&config);
    let sns = SdkSns::new(&config);
    cleanup(&sqs, &sns).await?;

    Ok(())
}
