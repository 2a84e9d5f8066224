//! Error types for the chat server and client
//!
//! Defines server-side errors, chat client errors, and prompt command errors.
//! Uses thiserror for ergonomic error definitions.

use std::net::SocketAddr;

use thiserror::Error;

/// Server-side errors
///
/// None of these reach the dispatcher: peer I/O failures are turned into
/// `Disconnected` events by the connection handler.
#[derive(Debug, Error)]
pub enum AppError {
    /// IO error (fatal for the affected connection)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Listening endpoint could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Remote address of an accepted connection is unavailable
    #[error("Cannot determine peer address: {0}")]
    PeerAddress(std::io::Error),
}

/// Chat client errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// No open connection to a server
    #[error("Not connected to a server")]
    NotConnected,

    /// A connection is already open
    #[error("Already connected to {0}")]
    AlreadyConnected(SocketAddr),

    /// Address could not be parsed
    #[error("Invalid address: '{0}'")]
    InvalidAddress(String),

    /// IO error while connecting or writing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Prompt command errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    /// No command with this name
    #[error("Unknown command: /{0}")]
    UnknownCommand(String),

    /// Command needs an argument that was not given
    #[error("Usage: {usage}")]
    MissingArgument { usage: &'static str },
}
