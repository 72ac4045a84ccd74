use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::config::ProbeConfig;
use crate::error::{ProbeError, Result};

static CONNECTION_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A single TCP stream to the target.
///
/// I/O failures after the connection is established never surface as
/// errors: a failed send is logged, a failed read yields an empty
/// response.
#[derive(Debug)]
pub struct Connection {
    id: u64,
    stream: TcpStream,
    recv_buffer: usize,
}

impl Connection {
    /// Connect to `config.host:config.port`.
    ///
    /// Failure is fatal for the whole run and comes back as
    /// [`ProbeError::Connect`] carrying the OS error.
    pub fn open(config: &ProbeConfig) -> Result<Self> {
        let addr = config.addr();
        let stream = TcpStream::connect((config.host.as_str(), config.port))
            .map_err(|source| ProbeError::Connect {
                addr: addr.clone(),
                source,
            })?;

        if let Err(e) = stream.set_read_timeout(config.read_timeout) {
            tracing::warn!(%addr, error = %e, "could not apply read timeout");
        }

        let conn = Connection {
            id: CONNECTION_COUNTER.fetch_add(1, Ordering::SeqCst),
            stream,
            recv_buffer: config.recv_buffer,
        };
        tracing::debug!(
            conn = conn.id,
            %addr,
            local = ?conn.stream.local_addr().ok(),
            read_timeout = ?conn.read_timeout(),
            "connected"
        );

        Ok(conn)
    }

    /// Process-wide sequence number, for log correlation.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Write the whole request.
    pub fn send(&mut self, request: &[u8]) {
        match self.stream.write_all(request).and_then(|_| self.stream.flush()) {
            Ok(()) => tracing::trace!(conn = self.id, bytes = request.len(), "sent"),
            Err(e) => tracing::warn!(conn = self.id, error = %e, "send failed"),
        }
    }

    /// One read of at most the configured buffer size.
    ///
    /// Returns an empty buffer on EOF, timeout or any read error.
    pub fn receive(&mut self) -> Vec<u8> {
        let mut buffer = vec![0u8; self.recv_buffer];
        match self.stream.read(&mut buffer) {
            Ok(n) => {
                buffer.truncate(n);
                if n == 0 {
                    tracing::debug!(conn = self.id, "connection closed by target");
                } else {
                    tracing::trace!(conn = self.id, bytes = n, "received");
                }
                buffer
            }
            Err(e) => {
                tracing::warn!(conn = self.id, error = %e, "receive failed");
                Vec::new()
            }
        }
    }

    /// Read timeout currently applied to the socket.
    pub fn read_timeout(&self) -> Option<Duration> {
        self.stream.read_timeout().ok().flatten()
    }

    /// Shut down both directions and release the socket.
    pub fn close(self) {
        if let Err(e) = self.stream.shutdown(Shutdown::Both) {
            tracing::debug!(conn = self.id, error = %e, "shutdown failed");
        }
        tracing::debug!(conn = self.id, "closed");
    }
}
