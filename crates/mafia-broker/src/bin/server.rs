//! Wristband broker binary.
//!
//! Listens for TCP clients and relays publishes to topic subscribers until
//! Ctrl+C.

use clap::Parser;
use mafia_broker::{BrokerConfig, BrokerServer};
use mafia_transport::DEFAULT_MAX_FRAME;

#[derive(Parser)]
#[command(name = "mafia-broker", about = "Publish/subscribe broker for game wristbands")]
struct Cli {
    /// Address to listen on (overrides MAFIA_BROKER_BIND).
    #[arg(long)]
    bind: Option<String>,

    /// Maximum envelope line length in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_FRAME)]
    max_frame: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = BrokerConfig::new().max_frame(cli.max_frame);
    if let Some(bind) = cli.bind {
        config = config.bind_addr(bind);
    }

    let server = BrokerServer::bind(config).await?;
    let broker = server.broker();
    tracing::info!(
        "mafia-broker v{} listening on {}",
        env!("CARGO_PKG_VERSION"),
        server.local_addr()?
    );

    server
        .serve_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("failed to listen for Ctrl+C: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await;

    let stats = serde_json::to_string(&broker.stats().snapshot())?;
    tracing::info!("final stats: {stats}");

    Ok(())
}
