//! Connection Manager Implementation

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::echo::{EchoHandler, EchoSession};
use crate::error::EchoError;
use crate::Result;

/// Manages the listening socket and the lifecycle of accepted connections.
///
/// The accept loop is the only owner of the listener. Each accepted stream is
/// moved into its own spawned handler task; the only state shared across
/// handlers is the atomic active-connection gauge and the connection-id
/// counter.
pub struct ConnectionManager {
    listener: Option<TcpListener>,
    config: Arc<Config>,
    active_connections: Arc<AtomicUsize>,
    next_connection_id: Arc<AtomicUsize>,
    shutdown_flag: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
}

impl ConnectionManager {
    /// Create a new ConnectionManager
    pub fn new(config: Arc<Config>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            listener: None,
            config,
            active_connections: Arc::new(AtomicUsize::new(0)),
            next_connection_id: Arc::new(AtomicUsize::new(1)),
            shutdown_flag: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
        }
    }

    /// Bind the listening socket without starting the accept loop.
    ///
    /// A bind failure is fatal and surfaces as [`EchoError::Bind`]; the
    /// server never proceeds to accept after a failed bind.
    pub async fn bind(&mut self) -> Result<()> {
        let bind_addr = self.config.server.bind_addr;

        info!("Binding TCP listener to {}", bind_addr);
        let listener = TcpListener::bind(bind_addr)
            .await
            .map_err(|source| EchoError::Bind {
                addr: bind_addr,
                source,
            })?;

        info!("Server started, listening on {}", listener.local_addr()?);
        self.listener = Some(listener);

        Ok(())
    }

    /// Start the connection manager and begin accepting connections
    pub async fn start(&mut self) -> Result<()> {
        if self.listener.is_none() {
            self.bind().await?;
        }

        self.accept_connections().await
    }

    /// Main connection acceptance loop.
    ///
    /// Runs until a shutdown signal arrives. A failed accept is logged and
    /// the loop keeps going; the listener is closed when the loop exits.
    async fn accept_connections(&mut self) -> Result<()> {
        let listener = self
            .listener
            .take()
            .ok_or_else(|| anyhow::anyhow!("Listener not initialized"))?;

        info!("Starting connection acceptance loop");
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                // Listen for new connections
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, addr)) => {
                            if self.shutdown_flag.load(Ordering::Relaxed) {
                                debug!("Rejecting connection from {} due to shutdown", addr);
                                continue;
                            }

                            self.dispatch_handler(stream, addr);
                        }
                        Err(source) => {
                            // A single failed accept never stops the server.
                            let err = EchoError::Accept { source };
                            error!("{}", err);
                        }
                    }
                }
                // Listen for shutdown signal
                _ = shutdown_rx.recv() => {
                    info!("Received shutdown signal, stopping connection acceptance");
                    self.shutdown_flag.store(true, Ordering::Relaxed);
                    break;
                }
            }
        }

        info!("Connection acceptance loop stopped");
        // The listener drops here, closing the listening endpoint.
        Ok(())
    }

    /// Spawn an independent handler task for one accepted connection.
    ///
    /// The stream is moved into the task, so exactly one handler owns the
    /// connection for its entire lifetime and releases it when the task ends.
    fn dispatch_handler(&self, stream: tokio::net::TcpStream, addr: SocketAddr) {
        let connection_id = format!(
            "conn_{}",
            self.next_connection_id.fetch_add(1, Ordering::Relaxed)
        );

        let buffer_size = self.config.server.buffer_size;
        let active_connections = Arc::clone(&self.active_connections);

        tokio::spawn(async move {
            let active = active_connections.fetch_add(1, Ordering::Relaxed) + 1;
            info!("Client {} connected as {}", addr, connection_id);
            info!("Active connections: {}", active);

            let session = EchoSession::new(connection_id.clone(), addr);
            let handler = EchoHandler::new(stream, buffer_size);

            match handler.run(&session).await {
                Ok(()) => {
                    info!("Client {} disconnected", addr);
                }
                Err(e) => {
                    // Contained to this connection; the accept loop and the
                    // other handlers never see it.
                    warn!("{}", e);
                }
            }

            session.log_close();
            active_connections.fetch_sub(1, Ordering::Relaxed);
        });
    }

    /// Get the number of active connections
    pub fn get_active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    /// Get the bound address if the listener is initialized
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener
            .as_ref()
            .and_then(|listener| listener.local_addr().ok())
    }

    /// Get a handle that stops the accept loop when sent to
    pub fn shutdown_handle(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Get a shutdown receiver for external components
    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Initiate shutdown of the accept loop
    pub fn initiate_shutdown(&self) {
        info!("Initiating shutdown of connection manager");
        self.shutdown_flag.store(true, Ordering::Relaxed);

        if self.shutdown_tx.send(()).is_err() {
            warn!("Accept loop is not running, nothing to shut down");
        }
    }

    /// Check if shutdown has been initiated
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown_flag.load(Ordering::Relaxed)
    }
}
