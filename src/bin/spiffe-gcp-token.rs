use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use spiffe_gcp_token::cache::{spiffe_token_source, TokenProvider};
use spiffe_gcp_token::config::proc_initiator;
use spiffe_gcp_token::credentials::Credentials;
use spiffe_gcp_token::resilience::retry::RetrySettings;
use spiffe_gcp_token::storage::StorageClient;
use spiffe_gcp_token::utils::logging::LogLevel;
use spiffe_gcp_token::utils::{config_loader, http_client, logging};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "spiffe-gcp-token.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the service account access token as JSON
    Token,
    /// List the buckets of a project using the exchanged credentials
    ListBuckets {
        #[arg(long, env = "PROJECT_ID")]
        project: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level)?;

    // -------------------------------
    // 2. Build the token source
    // -------------------------------

    let exchange_config = proc_initiator::exchange_config(&service_config)?;
    let client = http_client::build(Duration::from_secs(service_config.settings.http_timeout_seconds))?;
    let retry = RetrySettings::from(service_config.settings.retry.as_ref());
    let credentials = Credentials::new(spiffe_token_source(exchange_config, client.clone()));

    // -------------------------------
    // 3. Run the command
    // -------------------------------

    match args.command {
        Command::Token => {
            let token = retry
                .run_with_retry(|| credentials.provider().token())
                .await
                .context("failed to obtain access token")?;
            info!(expiry = %token.expiry, "access token obtained");
            println!("{}", serde_json::to_string_pretty(&token)?);
        }
        Command::ListBuckets { project } => {
            // warm the cache with the caller-side retry policy, bucket pages reuse it
            retry
                .run_with_retry(|| credentials.provider().token())
                .await
                .context("failed to obtain access token")?;

            let storage = StorageClient::new(client, credentials);
            for bucket in storage.list_buckets(&project).await? {
                println!("Bucket: {}", bucket.name);
            }
        }
    }

    Ok(())
}
