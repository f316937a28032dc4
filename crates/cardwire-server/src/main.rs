//! Cardwire server binary.
//!
//! # Usage
//!
//! ```bash
//! # Start on the default port, loading server.crt/server.key from the
//! # working directory
//! cardwire-server 9000
//!
//! # Point at TLS material kept somewhere else
//! cardwire-server 9000 --cert /etc/cardwire/server.crt --key /etc/cardwire/server.key
//! ```

use clap::Parser;
use cardwire_server::{Server, ServerConfig};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Cardwire match protocol server
#[derive(Parser, Debug)]
#[command(name = "cardwire-server")]
#[command(about = "Turn-based card combat protocol server")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(default_value_t = 9000)]
    port: u16,

    /// Path to the TLS certificate (PEM format)
    #[arg(long, default_value = "server.crt")]
    cert: String,

    /// Path to the TLS private key (PEM format)
    #[arg(long, default_value = "server.key")]
    key: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let config =
        ServerConfig { bind_address: format!("0.0.0.0:{}", args.port), cert_path: Some(args.cert), key_path: Some(args.key) };

    let exit_code = match run(config).await {
        Ok(()) => 0,
        Err(err) => {
            tracing::error!(%err, "server init failed");
            1
        },
    };

    std::process::exit(exit_code);
}

async fn run(config: ServerConfig) -> Result<(), cardwire_server::ServerError> {
    let server = Server::bind(config).await?;
    tracing::info!(addr = %server.local_addr()?, "cardwire server bound");
    server.run().await
}
