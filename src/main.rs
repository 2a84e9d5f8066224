//! Relay Chat Server - Entry Point
//!
//! Binds the listening socket and runs the acceptor, which starts the
//! ChatServer dispatcher.

use std::env;

use tracing::info;
use tracing_subscriber::EnvFilter;

use relay_chat::{Acceptor, ServerConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=relay_chat=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("relay_chat=info")),
        )
        .init();

    // Bind address from command line, RELAY_CHAT_ADDR, or default
    let config = ServerConfig::from_args(env::args().skip(1));

    let acceptor = Acceptor::bind(config).await?;
    info!("Relay Chat Server listening on {}", acceptor.local_addr()?);

    acceptor.run().await;

    Ok(())
}
