use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use url::Url;

use dirstream_client::{Client, ClientConfig};

/// Stream a directory tree and its changes to a WebSocket server.
#[derive(Debug, Parser)]
#[command(name = "dirstream", version, about)]
struct Cli {
    /// WebSocket server to stream to.
    #[arg(long, default_value = "ws://127.0.0.1:12345")]
    server: Url,

    /// Directory tree to observe.
    #[arg(long)]
    root: PathBuf,

    /// Reconnect attempts before giving up; -1 retries forever.
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    max_reconnect_attempts: i32,

    /// Fixed wait between reconnect attempts, in milliseconds.
    #[arg(long, default_value_t = 2000)]
    retry_interval_ms: u64,

    /// Follow symbolic links while scanning and watching.
    #[arg(long)]
    follow_symlinks: bool,

    /// Enable debug logging, including full message payloads.
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .init();

    let config = ClientConfig::new(cli.server, cli.root)?
        .with_max_reconnect_attempts(cli.max_reconnect_attempts)
        .with_retry_interval_ms(cli.retry_interval_ms)
        .with_follow_symlinks(cli.follow_symlinks)
        .with_debug(cli.debug);

    let mut client = Client::new(config)?;

    let shutdown = client.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupt received, shutting down");
            shutdown.cancel();
        }
    });

    client.run().await?;
    Ok(())
}
