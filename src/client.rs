//! Chat client
//!
//! The presentation-side collaborator: connects to a server, sends prompt
//! text, and reports everything worth showing as log lines through a
//! [`LogSink`].

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::command::{parse_input, Command, Input, COMMANDS};
use crate::config::{DEFAULT_PORT, DISCONNECT_MESSAGE, READ_BUFFER_SIZE};
use crate::error::ClientError;

/// How a log line should be rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Chat text
    Regular,
    /// Status changes
    Info,
    /// Failures
    Error,
}

/// Receives rendered log lines
pub trait LogSink: Send + Sync {
    fn log_line(&self, text: &str, severity: Severity);
}

impl<F> LogSink for F
where
    F: Fn(&str, Severity) + Send + Sync,
{
    fn log_line(&self, text: &str, severity: Severity) {
        self(text, severity)
    }
}

/// Whether the prompt loop should keep going
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Parse `ip:port`, or a bare IP on the default port
pub fn resolve_address(input: &str) -> Result<SocketAddr, ClientError> {
    let input = input.trim();

    if let Ok(addr) = input.parse::<SocketAddr>() {
        return Ok(addr);
    }
    if let Ok(ip) = input.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(ClientError::InvalidAddress(input.to_string()))
}

struct Connection {
    remote: SocketAddr,
    writer: OwnedWriteHalf,
    reader: JoinHandle<()>,
}

impl Connection {
    /// False once the server has closed the stream
    fn is_open(&self) -> bool {
        !self.reader.is_finished()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

/// Connection to a chat server plus the sink it reports to
pub struct ChatClient {
    sink: Arc<dyn LogSink>,
    connection: Option<Connection>,
}

impl ChatClient {
    /// Create a disconnected client reporting to `sink`
    pub fn new(sink: impl LogSink + 'static) -> Self {
        Self {
            sink: Arc::new(sink),
            connection: None,
        }
    }

    /// Check if a connection is open and the server has not closed it
    pub fn is_connected(&self) -> bool {
        self.connection.as_ref().is_some_and(Connection::is_open)
    }

    /// Address of the connected server
    pub fn remote_addr(&self) -> Option<SocketAddr> {
        self.connection
            .as_ref()
            .filter(|connection| connection.is_open())
            .map(|connection| connection.remote)
    }

    /// Connect to a server
    ///
    /// Everything the server sends is forwarded to the sink as `Regular`
    /// lines until the stream ends.
    pub async fn connect(&mut self, address: &str) -> Result<SocketAddr, ClientError> {
        if let Some(remote) = self.remote_addr() {
            return Err(ClientError::AlreadyConnected(remote));
        }
        // Drop a connection the server already closed
        self.connection = None;

        let remote = resolve_address(address)?;
        let stream = TcpStream::connect(remote).await?;
        let (reader, writer) = stream.into_split();

        let reader = tokio::spawn(read_loop(reader, Arc::clone(&self.sink)));
        self.connection = Some(Connection {
            remote,
            writer,
            reader,
        });

        debug!("Connected to {}", remote);
        self.sink
            .log_line(&format!("Connected to {}", remote), Severity::Info);
        Ok(remote)
    }

    /// Close the connection
    pub async fn disconnect(&mut self) -> Result<(), ClientError> {
        let Some(mut connection) = self.connection.take() else {
            return Err(ClientError::NotConnected);
        };

        connection.reader.abort();
        if let Err(e) = connection.writer.shutdown().await {
            debug!("Shutdown of {} failed: {}", connection.remote, e);
        }

        self.sink.log_line(DISCONNECT_MESSAGE, Severity::Info);
        Ok(())
    }

    /// Send raw text to the server
    pub async fn send_text(&mut self, text: &str) -> Result<(), ClientError> {
        let connection = match self.connection.as_mut() {
            Some(connection) if connection.is_open() => connection,
            _ => return Err(ClientError::NotConnected),
        };

        connection.writer.write_all(text.as_bytes()).await?;
        Ok(())
    }

    /// Handle one prompt line
    ///
    /// Chat text is echoed locally and sent when connected. Failures are
    /// reported to the sink as `Error` lines and never end the session.
    pub async fn handle_input(&mut self, line: &str) -> Flow {
        match parse_input(line) {
            Input::Text(text) => {
                if text.is_empty() {
                    return Flow::Continue;
                }
                self.sink.log_line(&text, Severity::Regular);
                if self.is_connected() {
                    if let Err(e) = self.send_text(&text).await {
                        self.log_error(&e);
                    }
                }
                Flow::Continue
            }
            Input::Command { name, argument } => match Command::parse(&name, &argument) {
                Ok(command) => self.run_command(command).await,
                Err(e) => {
                    self.log_error(&e);
                    Flow::Continue
                }
            },
        }
    }

    async fn run_command(&mut self, command: Command) -> Flow {
        let result = match command {
            Command::Connect { address } => self.connect(&address).await.map(|_| ()),
            Command::Disconnect => self.disconnect().await,
            Command::Quit => return Flow::Quit,
            Command::Help => {
                for info in COMMANDS.iter() {
                    self.sink.log_line(
                        &format!("{} - {}", info.signature, info.description),
                        Severity::Info,
                    );
                }
                Ok(())
            }
        };

        if let Err(e) = result {
            self.log_error(&e);
        }
        Flow::Continue
    }

    fn log_error(&self, err: &dyn std::error::Error) {
        self.sink.log_line(&err.to_string(), Severity::Error);
    }
}

/// Forward server output to the sink until the stream ends
async fn read_loop(mut reader: OwnedReadHalf, sink: Arc<dyn LogSink>) {
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];

    loop {
        match reader.read(&mut buffer).await {
            Ok(0) => {
                sink.log_line("Server closed the connection", Severity::Info);
                break;
            }
            Ok(n) => {
                sink.log_line(&String::from_utf8_lossy(&buffer[..n]), Severity::Regular);
            }
            Err(e) => {
                sink.log_line(&format!("Connection lost: {}", e), Severity::Error);
                break;
            }
        }
    }
}
