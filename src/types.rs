//! Basic type definitions for the chat server
//!
//! Provides newtype wrappers for type safety:
//! - `ConnectionId`: the peer's socket address, used as the registry key

use std::net::SocketAddr;

/// Connection identity (newtype pattern)
///
/// Wraps the remote address+port of one connection. Unique while the
/// connection lives, but the transport may hand the same address to a
/// later connection, so it is not a permanent identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub SocketAddr);

impl ConnectionId {
    /// Get the underlying socket address
    pub fn addr(&self) -> SocketAddr {
        self.0
    }
}

impl From<SocketAddr> for ConnectionId {
    fn from(addr: SocketAddr) -> Self {
        Self(addr)
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
