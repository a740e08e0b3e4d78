//! Echo Session

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Tracks one accepted connection for observability
#[derive(Debug)]
pub struct EchoSession {
    pub connection_id: String,
    pub peer_addr: SocketAddr,
    pub start_time: Instant,
    bytes_echoed: AtomicU64,
    chunks: AtomicU64,
}

impl EchoSession {
    /// Create a new echo session
    pub fn new(connection_id: String, peer_addr: SocketAddr) -> Self {
        debug!("Creating new echo session: {} ({})", connection_id, peer_addr);

        Self {
            connection_id,
            peer_addr,
            start_time: Instant::now(),
            bytes_echoed: AtomicU64::new(0),
            chunks: AtomicU64::new(0),
        }
    }

    /// Get bytes echoed back to the peer so far
    pub fn bytes_echoed(&self) -> u64 {
        self.bytes_echoed.load(Ordering::Relaxed)
    }

    /// Get the number of read/echo cycles completed so far
    pub fn chunks(&self) -> u64 {
        self.chunks.load(Ordering::Relaxed)
    }

    /// Get session duration
    pub fn duration(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    /// Record one completed echo cycle
    pub fn record_chunk(&self, bytes: u64) {
        self.bytes_echoed.fetch_add(bytes, Ordering::Relaxed);
        self.chunks.fetch_add(1, Ordering::Relaxed);
    }

    /// Log session statistics on close
    pub fn log_close(&self) {
        let duration = self.duration();
        let bytes_echoed = self.bytes_echoed();
        let chunks = self.chunks();

        info!(
            connection_id = %self.connection_id,
            peer_addr = %self.peer_addr,
            duration_ms = duration.as_millis(),
            bytes_echoed = bytes_echoed,
            chunks = chunks,
            "Echo session closed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_counters_accumulate() {
        let session = EchoSession::new("conn_1".to_string(), "127.0.0.1:40000".parse().unwrap());
        assert_eq!(session.bytes_echoed(), 0);
        assert_eq!(session.chunks(), 0);

        session.record_chunk(19);
        session.record_chunk(2);

        assert_eq!(session.bytes_echoed(), 21);
        assert_eq!(session.chunks(), 2);
    }
}
