//! Connection acceptor
//!
//! Owns the listening socket, starts the ChatServer dispatcher, and spawns a
//! handler task per accepted connection.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::{error, info};

use crate::channel::channel;
use crate::config::ServerConfig;
use crate::error::AppError;
use crate::handler::handle_connection;
use crate::server::ChatServer;

/// Bound listening endpoint, ready to run
#[derive(Debug)]
pub struct Acceptor {
    listener: TcpListener,
    config: ServerConfig,
}

impl Acceptor {
    /// Bind the configured address
    pub async fn bind(config: ServerConfig) -> Result<Self, AppError> {
        let listener = TcpListener::bind(&config.bind_addr)
            .await
            .map_err(|source| AppError::Bind {
                addr: config.bind_addr.clone(),
                source,
            })?;

        Ok(Self { listener, config })
    }

    /// Address actually bound (resolves port 0)
    pub fn local_addr(&self) -> Result<SocketAddr, AppError> {
        Ok(self.listener.local_addr()?)
    }

    /// Start the dispatcher and accept connections forever
    ///
    /// The acceptor keeps its own producer handle for as long as it runs,
    /// so the event queue never closes underneath the dispatcher.
    pub async fn run(self) {
        let (events, receiver) = channel();
        tokio::spawn(ChatServer::new(receiver, self.config.greeting.clone()).run());
        info!("ChatServer dispatcher started");

        let buffer_size = self.config.read_buffer_size;
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    info!("Accepted connection from {}", addr);
                    let events = events.clone();

                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, events, buffer_size).await {
                            error!("Connection handler error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}
