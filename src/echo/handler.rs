//! Echo Handler
//!
//! Runs the per-connection echo loop: read a chunk of up to `buffer_size`
//! bytes, write the same bytes back, repeat until the peer closes the stream
//! or an I/O error occurs.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, info};

use crate::echo::EchoSession;
use crate::error::EchoError;

/// Per-connection echo loop over one exclusively owned stream
pub struct EchoHandler {
    stream: TcpStream,
    buffer_size: usize,
}

impl EchoHandler {
    /// Create a new echo handler taking ownership of the stream
    pub fn new(stream: TcpStream, buffer_size: usize) -> Self {
        Self {
            stream,
            buffer_size,
        }
    }

    /// Run the echo loop until end-of-stream or an I/O error.
    ///
    /// A zero-length read is the peer's orderly close and ends the loop
    /// normally. Any other read or write failure maps to
    /// [`EchoError::ConnectionIo`] and terminates only this connection. The
    /// stream is dropped when this method returns, on every exit path.
    pub async fn run(mut self, session: &EchoSession) -> Result<(), EchoError> {
        let mut buf = vec![0u8; self.buffer_size];

        loop {
            let n = self
                .stream
                .read(&mut buf)
                .await
                .map_err(|source| connection_io_error(session, source))?;

            if n == 0 {
                debug!("Peer {} closed the stream", session.peer_addr);
                break;
            }

            info!(
                "Received {} bytes from {}: {}",
                n,
                session.peer_addr,
                String::from_utf8_lossy(&buf[..n])
            );

            // write_all retries until every byte of the chunk is on the wire,
            // so a partial write never drops data.
            self.stream
                .write_all(&buf[..n])
                .await
                .map_err(|source| connection_io_error(session, source))?;

            session.record_chunk(n as u64);
        }

        Ok(())
    }
}

fn connection_io_error(session: &EchoSession, source: std::io::Error) -> EchoError {
    EchoError::ConnectionIo {
        connection_id: session.connection_id.clone(),
        peer: session.peer_addr,
        source,
    }
}
