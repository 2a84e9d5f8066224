//! TCP connection handler
//!
//! Handles individual client connections: hands the write half to the
//! ChatServer, then turns every read into an event until the stream ends.

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::channel::Sender;
use crate::error::AppError;
use crate::server::Event;
use crate::types::ConnectionId;

/// Handle a new TCP connection
///
/// Identifies the connection by its peer address, splits it, and runs the
/// read loop. Fails only if the peer address is unavailable, in which case
/// nothing is sent to the ChatServer.
pub async fn handle_connection(
    stream: TcpStream,
    events: Sender<Event>,
    buffer_size: usize,
) -> Result<(), AppError> {
    let peer_addr = stream.peer_addr().map_err(AppError::PeerAddress)?;
    let connection_id = ConnectionId::from(peer_addr);

    debug!("New TCP connection from {}", connection_id);

    let (reader, writer) = stream.into_split();
    handle_stream(connection_id, reader, writer, events, buffer_size).await;

    Ok(())
}

/// Run the read loop for one connection
///
/// Emits `Connected` with `writer`, one `Message` per non-empty read, and
/// finally `Disconnected` on end of stream or any read error.
pub async fn handle_stream<R, W>(
    connection_id: ConnectionId,
    mut reader: R,
    writer: W,
    events: Sender<Event<W>>,
    buffer_size: usize,
) where
    R: AsyncRead + Unpin,
{
    events.send(Event::Connected {
        connection_id,
        writer,
    });

    let mut buffer = vec![0u8; buffer_size.max(1)];
    loop {
        match reader.read(&mut buffer).await {
            Ok(0) => {
                debug!("Connection {} reached end of stream", connection_id);
                break;
            }
            Ok(n) => {
                events.send(Event::Message {
                    connection_id,
                    payload: buffer[..n].to_vec(),
                });
            }
            Err(e) => {
                debug!("Read error on {}: {}", connection_id, e);
                break;
            }
        }
    }

    events.send(Event::Disconnected { connection_id });
    info!("Client {} disconnected", connection_id);
}
