//! Server configuration and protocol constants

use std::env;

/// Default listening address
pub const DEFAULT_ADDR: &str = "0.0.0.0:6969";

/// Port used when a client is given a bare IP address
pub const DEFAULT_PORT: u16 = 6969;

/// Environment variable consulted when no address argument is given
pub const ADDR_ENV_VAR: &str = "RELAY_CHAT_ADDR";

/// Written to every new connection before any relayed traffic
pub const GREETING: &[u8] = b"Hello, you are now connected to the server...";

/// Shown locally by the client after it disconnects
pub const DISCONNECT_MESSAGE: &str = "You are now disconnected...";

/// Upper bound of a single read from a connection
pub const READ_BUFFER_SIZE: usize = 1024;

/// Server settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the acceptor binds to
    pub bind_addr: String,
    /// Bytes written to each newly registered connection
    pub greeting: Vec<u8>,
    /// Size of the per-connection read buffer
    pub read_buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_ADDR.to_string(),
            greeting: GREETING.to_vec(),
            read_buffer_size: READ_BUFFER_SIZE,
        }
    }
}

impl ServerConfig {
    /// Build from command line arguments (program name excluded)
    ///
    /// The first argument is the bind address. Without it, the
    /// `RELAY_CHAT_ADDR` environment variable is used, then the default.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let bind_addr = args
            .into_iter()
            .next()
            .or_else(|| env::var(ADDR_ENV_VAR).ok())
            .filter(|addr| !addr.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());

        Self {
            bind_addr,
            ..Self::default()
        }
    }

    pub fn with_bind_addr(mut self, bind_addr: impl Into<String>) -> Self {
        self.bind_addr = bind_addr.into();
        self
    }

    pub fn with_greeting(mut self, greeting: impl Into<Vec<u8>>) -> Self {
        self.greeting = greeting.into();
        self
    }

    /// Set the read buffer size (clamped to at least one byte)
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }
}
