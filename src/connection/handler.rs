//! Connection Handler Module
//!
//! Each client connection to the portset service gets its own handler task
//! that runs in a loop, reading command frames and sending responses.
//!
//! ## Connection Lifecycle
//!
//! ```text
//! 1. Client connects
//!        │
//!        ▼
//! 2. ConnectionHandler spawned
//!        │
//!        ▼
//! 3. loop {
//!        read bytes from socket
//!        parse command frame
//!        execute against the set
//!        send response frame
//!    }
//!        │
//!        ▼
//! 4. Client disconnects / error → handler task ends
//! ```
//!
//! ## Buffer Management
//!
//! TCP is a stream: a read may deliver half a frame or several frames at
//! once. Incoming data accumulates in a `BytesMut` buffer; the parser
//! consumes complete frames from its front and leaves partial ones for the
//! next read, which also gives pipelined commands for free. A command
//! frame is at most a header plus 64 KB of attributes, so the buffer cap
//! is sized to hold two of them.

use crate::commands::CommandHandler;
use crate::protocol::{
    CommandFrame, FrameParser, ParseError, Response, COMMAND_HEADER_LEN, MAX_ATTR_BYTES,
};
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tracing::{debug, info, trace, warn};

/// Read buffer cap: two maximum-size command frames.
const MAX_BUFFER_SIZE: usize = 2 * (COMMAND_HEADER_LEN + MAX_ATTR_BYTES);

/// Initial buffer capacity; most command frames are a few dozen bytes.
const INITIAL_BUFFER_SIZE: usize = 512;

/// Counters shared by every connection task.
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total command frames executed
    pub frames_processed: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn frame_processed(&self) {
        self.frames_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn add_bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client connection: one read buffer, one parser, and a
/// shared handle to the command layer.
pub struct ConnectionHandler {
    stream: BufWriter<TcpStream>,
    /// Client's address, for logging only.
    addr: SocketAddr,
    /// Accumulation buffer for incoming frame bytes.
    buffer: BytesMut,
    command_handler: CommandHandler,
    parser: FrameParser,
    stats: Arc<ConnectionStats>,
}

impl ConnectionHandler {
    pub fn new(
        stream: TcpStream,
        addr: SocketAddr,
        command_handler: CommandHandler,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            command_handler,
            parser: FrameParser::new(),
            stats,
        }
    }

    /// Runs the read-execute-respond loop until the client goes away or a
    /// non-recoverable error occurs.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "client connected");

        let result = self.serve().await;

        match &result {
            Ok(()) | Err(ConnectionError::ClientDisconnected) => {
                debug!(client = %self.addr, "client disconnected")
            }
            Err(ConnectionError::IoError(io_err))
                if io_err.kind() == std::io::ErrorKind::ConnectionReset =>
            {
                debug!(client = %self.addr, "connection reset by client")
            }
            Err(e) => warn!(client = %self.addr, error = %e, "connection error"),
        }

        self.stats.connection_closed();
        result
    }

    async fn serve(&mut self) -> Result<(), ConnectionError> {
        loop {
            // Drain every complete frame already buffered before reading
            // again, so pipelined commands are answered back to back.
            while let Some(frame) = self.next_frame()? {
                let response = self.command_handler.execute(frame).await;
                self.stats.frame_processed();
                self.send_response(&response).await?;
            }

            self.fill_buffer().await?;
        }
    }

    /// Takes one complete command frame off the front of the buffer.
    fn next_frame(&mut self) -> Result<Option<CommandFrame>, ConnectionError> {
        match self.parser.parse(&self.buffer)? {
            Some((frame, consumed)) => {
                let _ = self.buffer.split_to(consumed);
                trace!(
                    client = %self.addr,
                    op = ?frame.op,
                    consumed,
                    buffered = self.buffer.len(),
                    "parsed command frame"
                );
                Ok(Some(frame))
            }
            // Incomplete: leave the partial frame for the next read. A
            // parse error bubbles up instead; after a bad header there is
            // no way to re-synchronize the stream.
            None => Ok(None),
        }
    }

    /// Reads more bytes from the socket into the accumulation buffer.
    async fn fill_buffer(&mut self) -> Result<(), ConnectionError> {
        if self.buffer.len() >= MAX_BUFFER_SIZE {
            warn!(
                client = %self.addr,
                buffered = self.buffer.len(),
                "read buffer limit exceeded"
            );
            return Err(ConnectionError::BufferFull);
        }

        let n = self.stream.get_mut().read_buf(&mut self.buffer).await?;
        if n == 0 {
            return if self.buffer.is_empty() {
                Err(ConnectionError::ClientDisconnected)
            } else {
                // The peer hung up mid-frame.
                Err(ConnectionError::UnexpectedEof)
            };
        }

        self.stats.add_bytes_read(n);
        trace!(client = %self.addr, bytes = n, "read data");
        Ok(())
    }

    async fn send_response(&mut self, response: &Response) -> Result<(), ConnectionError> {
        let bytes = response.serialize();
        self.stream.write_all(&bytes).await?;
        self.stream.flush().await?;
        self.stats.add_bytes_written(bytes.len());
        trace!(
            client = %self.addr,
            status = ?response.status,
            bytes = bytes.len(),
            "sent response"
        );
        Ok(())
    }
}

/// Errors that can occur while handling a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Command frame parse error
    #[error("parse error: {0}")]
    ParseError(#[from] ParseError),

    /// Client disconnected normally
    #[error("client disconnected")]
    ClientDisconnected,

    /// Unexpected end of stream (partial frame)
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// Buffer size limit exceeded
    #[error("read buffer limit exceeded")]
    BufferFull,
}

/// Creates a [`ConnectionHandler`] for an accepted socket and runs it to
/// completion. Ordinary disconnects are already logged by the handler, so
/// this just swallows the result.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    command_handler: CommandHandler,
    stats: Arc<ConnectionStats>,
) {
    let handler = ConnectionHandler::new(stream, addr, command_handler, stats);
    let _ = handler.run().await;
}
