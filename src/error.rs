//! Error Types
//!
//! Typed errors for the server's three failure classes. A zero-length read is
//! not an error anywhere in this crate; it is the peer's orderly close.

use std::net::SocketAddr;
use thiserror::Error;

/// Errors raised by the echo server.
#[derive(Debug, Error)]
pub enum EchoError {
    /// The listening socket could not be created. Fatal: the server must not
    /// proceed to accept connections.
    #[error("failed to bind listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// A single accept attempt failed. Transient: the accept loop logs it and
    /// keeps accepting.
    #[error("failed to accept incoming connection: {source}")]
    Accept {
        #[source]
        source: std::io::Error,
    },

    /// Read or write failed on an established connection. Terminates only the
    /// handler that owns that connection.
    #[error("connection {connection_id} from {peer} failed: {source}")]
    ConnectionIo {
        connection_id: String,
        peer: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}
