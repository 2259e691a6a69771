mod cli;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use eyre::{eyre, WrapErr};

use txstatus_core::fetch::HttpClient;
use txstatus_core::provider::{BlockCypher, BlockchainCom, StatusProvider};
use txstatus_core::{RetryPolicy, StatusError, StatusResolver, TxStatusQuery};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    // Logs go to stderr; stdout carries only the result.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    let retry = RetryPolicy::new(args.max_attempts, Duration::from_millis(args.retry_delay_ms))
        .context("invalid retry settings")?;
    let query = TxStatusQuery::new(&args.address, args.network)
        .context("invalid address")?
        .with_retry_policy(retry);

    let fetch = Arc::new(HttpClient::new(args.requests_per_second).context("build HTTP client")?);

    let mut blockcypher = BlockCypher::new(fetch.clone());
    if let Some(token) = &args.blockcypher_token {
        blockcypher = blockcypher.with_token(token);
    }
    let blockchain_com = BlockchainCom::new(fetch).with_pool_failure(args.pool_failure.into());
    let providers: Vec<Arc<dyn StatusProvider>> =
        vec![Arc::new(blockcypher), Arc::new(blockchain_com)];

    let resolver = StatusResolver::new(providers).with_policy(args.race_policy.into());

    tracing::info!(
        address = query.address(),
        network = %query.network(),
        policy = ?resolver.policy(),
        "querying providers"
    );

    match resolver.resolve(&query).await {
        Ok(Some(status)) => {
            let json = serde_json::to_string_pretty(&status).context("encode status")?;
            println!("{json}");
            Ok(())
        }
        Ok(None) => {
            println!("not found");
            Ok(())
        }
        Err(err @ StatusError::ResolutionFailed(_)) => Err(eyre!(err)
            .wrap_err("no provider produced a usable answer; check connectivity or raise --max-attempts")),
        Err(err) => Err(eyre!(err)),
    }
}
