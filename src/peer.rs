//! Peer struct definition
//!
//! Represents a registered connection as seen by the dispatcher: its
//! identity and the write half used to push bytes back to it.

use std::time::{Duration, Instant};

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::types::ConnectionId;

/// Registered connection
///
/// Exclusively owns the write handle once the dispatcher installs it.
#[derive(Debug)]
pub struct Peer<W> {
    /// Connection identity
    pub id: ConnectionId,
    /// Registration time
    pub connected_at: Instant,
    writer: W,
}

impl<W> Peer<W> {
    /// Create a new peer with the given ID and write handle
    pub fn new(id: ConnectionId, writer: W) -> Self {
        Self {
            id,
            connected_at: Instant::now(),
            writer,
        }
    }

    /// How long this peer has been registered
    pub fn connected_for(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

impl<W: AsyncWrite + Unpin> Peer<W> {
    /// Write bytes to this peer and flush them
    ///
    /// Waits until the whole buffer is accepted by the transport.
    pub async fn write(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.writer.write_all(bytes).await?;
        self.writer.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{connection_id, RecordingWriter};

    #[tokio::test]
    async fn test_peer_creation() {
        let (writer, _log) = RecordingWriter::new();
        let peer = Peer::new(connection_id(4000), writer);

        assert_eq!(peer.id, connection_id(4000));
        assert!(peer.connected_for() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_peer_write() {
        let (writer, log) = RecordingWriter::new();
        let mut peer = Peer::new(connection_id(4000), writer);

        peer.write(b"hello").await.unwrap();

        assert_eq!(log.writes(), vec![b"hello".to_vec()]);
    }

    #[tokio::test]
    async fn test_peer_write_error() {
        let (writer, log) = RecordingWriter::failing();
        let mut peer = Peer::new(connection_id(4000), writer);

        assert!(peer.write(b"hello").await.is_err());
        assert!(log.writes().is_empty());
    }
}
