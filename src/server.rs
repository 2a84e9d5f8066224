//! ChatServer dispatcher implementation
//!
//! The single consumer of the event queue. Owns the connection registry,
//! greets new connections and relays every message to all other peers.
//! Events are applied one at a time, so the registry needs no locking.

use tokio::io::AsyncWrite;
use tokio::net::tcp::OwnedWriteHalf;
use tracing::{debug, info, warn};

use crate::channel::Receiver;
use crate::peer::Peer;
use crate::registry::Registry;
use crate::types::ConnectionId;

/// Events sent from connection handlers to the ChatServer
#[derive(Debug)]
pub enum Event<W = OwnedWriteHalf> {
    /// New connection; `writer` is handed over to the registry
    Connected {
        connection_id: ConnectionId,
        writer: W,
    },
    /// Connection closed or failed
    Disconnected {
        connection_id: ConnectionId,
    },
    /// Bytes read from a connection, as returned by one read call
    Message {
        connection_id: ConnectionId,
        payload: Vec<u8>,
    },
}

/// The ChatServer dispatcher
///
/// Processes events from connection handlers until every producer handle
/// has been dropped.
pub struct ChatServer<W = OwnedWriteHalf> {
    /// All registered connections
    registry: Registry<W>,
    /// Written to each connection on registration
    greeting: Vec<u8>,
    /// Event receiver
    receiver: Receiver<Event<W>>,
}

impl<W: AsyncWrite + Unpin> ChatServer<W> {
    /// Create a new ChatServer with the given event receiver and greeting
    pub fn new(receiver: Receiver<Event<W>>, greeting: impl Into<Vec<u8>>) -> Self {
        Self {
            registry: Registry::new(),
            greeting: greeting.into(),
            receiver,
        }
    }

    /// Current connection registry
    pub fn registry(&self) -> &Registry<W> {
        &self.registry
    }

    /// Run the ChatServer event loop
    ///
    /// Returns once the queue is closed and drained. While the acceptor is
    /// alive it holds a producer handle, so in a running server this loop
    /// never ends.
    pub async fn run(mut self) {
        info!("ChatServer started");

        while let Some(event) = self.receiver.recv().await {
            self.handle_event(event).await;
        }

        info!("ChatServer shutting down");
    }

    /// Process a single event
    async fn handle_event(&mut self, event: Event<W>) {
        match event {
            Event::Connected {
                connection_id,
                writer,
            } => {
                self.handle_connected(connection_id, writer).await;
            }
            Event::Disconnected { connection_id } => {
                self.handle_disconnected(connection_id);
            }
            Event::Message {
                connection_id,
                payload,
            } => {
                self.handle_message(connection_id, payload).await;
            }
        }
    }

    /// Handle new connection: greet, then register
    async fn handle_connected(&mut self, connection_id: ConnectionId, writer: W) {
        info!("New connection from {}", connection_id);

        if self.registry.contains(&connection_id) {
            // Address reused before the stale entry was cleared
            warn!("Connection {} is already registered", connection_id);
            return;
        }

        let mut peer = Peer::new(connection_id, writer);
        if let Err(e) = peer.write(&self.greeting).await {
            warn!("Failed to greet {}: {}", connection_id, e);
        }
        self.registry.insert(peer);

        debug!("Total connections: {}", self.registry.len());
    }

    /// Handle disconnection
    fn handle_disconnected(&mut self, connection_id: ConnectionId) {
        let Some(peer) = self.registry.remove(&connection_id) else {
            debug!("Disconnect for unknown connection {}", connection_id);
            return;
        };

        info!(
            "Client with address {} has been disconnected after {:?}",
            connection_id,
            peer.connected_for()
        );
        debug!("Total connections: {}", self.registry.len());
    }

    /// Handle message: relay to every other connection
    async fn handle_message(&mut self, connection_id: ConnectionId, payload: Vec<u8>) {
        let delivery = self.registry.broadcast(connection_id, &payload).await;

        debug!(
            "Relayed {} bytes from {} to {} peers ({} failed)",
            payload.len(),
            connection_id,
            delivery.delivered,
            delivery.failed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::channel;
    use crate::config::GREETING;
    use crate::test_support::{connection_id, RecordingWriter, WriteLog};

    fn new_server() -> ChatServer<RecordingWriter> {
        let (_tx, rx) = channel();
        ChatServer::new(rx, GREETING)
    }

    async fn connect(server: &mut ChatServer<RecordingWriter>, port: u16) -> WriteLog {
        let (writer, log) = RecordingWriter::new();
        server
            .handle_event(Event::Connected {
                connection_id: connection_id(port),
                writer,
            })
            .await;
        log
    }

    fn message(port: u16, payload: &[u8]) -> Event<RecordingWriter> {
        Event::Message {
            connection_id: connection_id(port),
            payload: payload.to_vec(),
        }
    }

    #[tokio::test]
    async fn test_connect_sends_greeting() {
        let mut server = new_server();
        let log = connect(&mut server, 1).await;

        assert_eq!(log.writes(), vec![GREETING.to_vec()]);
        assert!(server.registry().contains(&connection_id(1)));
    }

    #[tokio::test]
    async fn test_reconnect_with_same_identity_is_idempotent() {
        let mut server = new_server();
        let first = connect(&mut server, 1).await;
        let second = connect(&mut server, 1).await;

        assert_eq!(server.registry().len(), 1);
        assert_eq!(first.writes().len(), 1);
        assert!(second.writes().is_empty());
    }

    #[tokio::test]
    async fn test_failed_greeting_still_registers() {
        let mut server = new_server();
        let (writer, _log) = RecordingWriter::failing();
        server
            .handle_event(Event::Connected {
                connection_id: connection_id(1),
                writer,
            })
            .await;

        assert!(server.registry().contains(&connection_id(1)));
    }

    #[tokio::test]
    async fn test_disconnect_removes_entry() {
        let mut server = new_server();
        connect(&mut server, 1).await;
        connect(&mut server, 2).await;

        server
            .handle_event(Event::Disconnected {
                connection_id: connection_id(1),
            })
            .await;

        assert!(!server.registry().contains(&connection_id(1)));
        assert_eq!(server.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_disconnect_unknown_is_noop() {
        let mut server = new_server();
        connect(&mut server, 1).await;

        server
            .handle_event(Event::Disconnected {
                connection_id: connection_id(99),
            })
            .await;
        server
            .handle_event(Event::Disconnected {
                connection_id: connection_id(99),
            })
            .await;

        assert_eq!(server.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_message_broadcast_excludes_sender() {
        let mut server = new_server();
        let a = connect(&mut server, 1).await;
        let b = connect(&mut server, 2).await;
        let c = connect(&mut server, 3).await;

        server.handle_event(message(1, b"hi")).await;

        // Greeting plus exactly one relayed write each
        assert_eq!(a.writes(), vec![GREETING.to_vec()]);
        assert_eq!(b.writes(), vec![GREETING.to_vec(), b"hi".to_vec()]);
        assert_eq!(c.writes(), vec![GREETING.to_vec(), b"hi".to_vec()]);
    }

    #[tokio::test]
    async fn test_message_after_peer_left() {
        let mut server = new_server();
        let a = connect(&mut server, 1).await;
        let b = connect(&mut server, 2).await;

        server
            .handle_event(Event::Disconnected {
                connection_id: connection_id(1),
            })
            .await;
        server.handle_event(message(2, b"anyone?")).await;

        assert_eq!(a.writes(), vec![GREETING.to_vec()]);
        assert_eq!(b.writes(), vec![GREETING.to_vec()]);
    }

    #[tokio::test]
    async fn test_message_from_unregistered_connection_is_relayed() {
        let mut server = new_server();
        let a = connect(&mut server, 1).await;

        server.handle_event(message(7, b"late")).await;

        assert_eq!(a.writes(), vec![GREETING.to_vec(), b"late".to_vec()]);
    }

    #[tokio::test]
    async fn test_run_drains_queue_then_stops() {
        let (tx, rx) = channel();
        let server = ChatServer::new(rx, GREETING);

        let (a_writer, a) = RecordingWriter::new();
        let (b_writer, b) = RecordingWriter::new();
        tx.send(Event::Connected {
            connection_id: connection_id(1),
            writer: a_writer,
        });
        tx.send(Event::Connected {
            connection_id: connection_id(2),
            writer: b_writer,
        });
        tx.send(message(1, b"one"));
        tx.send(message(1, b"two"));
        drop(tx);

        tokio::time::timeout(std::time::Duration::from_secs(5), server.run())
            .await
            .expect("dispatcher should stop once the queue is closed");

        assert_eq!(a.writes(), vec![GREETING.to_vec()]);
        assert_eq!(
            b.writes(),
            vec![GREETING.to_vec(), b"one".to_vec(), b"two".to_vec()]
        );
    }
}
