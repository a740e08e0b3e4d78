//! RustEcho Library
//!
//! A concurrent TCP echo server built on tokio: a single accept loop owns the
//! listening socket and spawns one handler task per accepted connection. Each
//! handler echoes whatever bytes arrive back to its peer until the peer closes
//! the stream.

pub mod config;
pub mod connection;
pub mod echo;
pub mod error;
pub mod shutdown;

pub use config::Config;
pub use connection::ConnectionManager;
pub use error::EchoError;
pub use shutdown::ShutdownCoordinator;

/// Common error type for the echo server
pub type Result<T> = anyhow::Result<T>;
