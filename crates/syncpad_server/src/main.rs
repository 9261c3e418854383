//! syncpad server binary.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use syncpad_server::{serve, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Single-document synchronization server with long-poll notification.
#[derive(Parser)]
#[command(name = "syncpad")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "SYNCPAD_ADDR", default_value = "127.0.0.1:8000")]
    bind_addr: SocketAddr,

    /// Directory holding the document and server secrets.
    #[arg(long, env = "SYNCPAD_DATA_DIR", default_value = "syncpad-data")]
    data_dir: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "syncpad=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::new(cli.bind_addr, cli.data_dir);

    if let Err(err) = serve(config).await {
        tracing::error!(error = %err, "server exited");
        std::process::exit(1);
    }
}
