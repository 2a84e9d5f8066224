//! In-memory write handles for dispatcher tests

use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use tokio::io::AsyncWrite;

use crate::types::ConnectionId;

/// Loopback identity with the given port
pub(crate) fn connection_id(port: u16) -> ConnectionId {
    ConnectionId(SocketAddr::from(([127, 0, 0, 1], port)))
}

/// Shared view of everything written through a [`RecordingWriter`]
#[derive(Debug, Clone, Default)]
pub(crate) struct WriteLog(Arc<Mutex<Vec<Vec<u8>>>>);

impl WriteLog {
    pub(crate) fn writes(&self) -> Vec<Vec<u8>> {
        self.0.lock().unwrap().clone()
    }
}

/// Records each `poll_write` buffer as one write, or fails every write
#[derive(Debug)]
pub(crate) struct RecordingWriter {
    log: WriteLog,
    fail: bool,
}

impl RecordingWriter {
    pub(crate) fn new() -> (Self, WriteLog) {
        let log = WriteLog::default();
        (
            Self {
                log: log.clone(),
                fail: false,
            },
            log,
        )
    }

    pub(crate) fn failing() -> (Self, WriteLog) {
        let (mut writer, log) = Self::new();
        writer.fail = true;
        (writer, log)
    }
}

impl AsyncWrite for RecordingWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        if self.fail {
            return Poll::Ready(Err(io::Error::from(io::ErrorKind::BrokenPipe)));
        }
        self.log.0.lock().unwrap().push(buf.to_vec());
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
