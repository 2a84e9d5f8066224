//! Minimal TCP Relay Chat Library
//!
//! A small chat service: every byte a client sends is relayed to every
//! other connected client.
//!
//! # Features
//! - Unbounded multi-producer, single-consumer event queue
//! - One handler task per TCP connection
//! - Greeting on connect
//! - Broadcast to all other connections, best effort per peer
//! - Line-oriented chat client with `/connect`, `/disconnect`, `/quit`, `/help`
//!
//! # Architecture
//! - `Acceptor` accepts connections and spawns a `handler` task for each
//! - Handlers push `Connected`, `Message` and `Disconnected` events into the
//!   event queue, one producer handle per handler
//! - `ChatServer` is the only consumer: it owns the connection registry and
//!   applies events one at a time, so the registry needs no locks
//!
//! # Example
//! ```ignore
//! use relay_chat::{Acceptor, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig::default().with_bind_addr("127.0.0.1:6969");
//!     let acceptor = Acceptor::bind(config).await.unwrap();
//!     acceptor.run().await;
//! }
//! ```

pub mod acceptor;
pub mod channel;
pub mod client;
pub mod command;
pub mod config;
pub mod error;
pub mod handler;
pub mod peer;
pub mod registry;
pub mod server;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-export main types for convenience
pub use acceptor::Acceptor;
pub use channel::{channel, Receiver, Sender};
pub use client::{ChatClient, Flow, LogSink, Severity};
pub use command::{Command, Input};
pub use config::ServerConfig;
pub use error::{AppError, ClientError, CommandError};
pub use handler::{handle_connection, handle_stream};
pub use peer::Peer;
pub use registry::{Delivery, Registry};
pub use server::{ChatServer, Event};
pub use types::ConnectionId;
