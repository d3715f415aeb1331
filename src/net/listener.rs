//! TCP listener with admission control.
//!
//! # Responsibilities
//! - Bind to the configured address, retrying forever on failure
//! - Accept incoming TCP connections
//! - Enforce max_connections via a semaphore
//!
//! The semaphore bounds the one-task-per-connection model: when every slot
//! is held, accepting pauses until a connection ends.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::config::ListenerConfig;

/// Delay between bind attempts when the address is unavailable.
const BIND_RETRY_DELAY: Duration = Duration::from_secs(5);

/// A bounded TCP listener that limits concurrent connections.
pub struct Listener {
    inner: TcpListener,
    connection_limit: Arc<Semaphore>,
    max_connections: usize,
}

impl Listener {
    /// Bind to the configured address, retrying indefinitely with a delay
    /// on failure so a lingering socket from a previous instance is waited
    /// out rather than fatal.
    pub async fn bind(config: &ListenerConfig) -> Self {
        let addr = config.socket_addr();
        let inner = loop {
            tracing::info!(address = %addr, "binding");
            match TcpListener::bind(&addr).await {
                Ok(listener) => break listener,
                Err(err) => {
                    tracing::warn!(address = %addr, error = %err, "bind failed, retrying");
                    tokio::time::sleep(BIND_RETRY_DELAY).await;
                }
            }
        };

        if let Ok(local) = inner.local_addr() {
            tracing::info!(
                address = %local,
                max_connections = config.max_connections,
                "listener bound"
            );
        }

        Self {
            inner,
            connection_limit: Arc::new(Semaphore::new(config.max_connections)),
            max_connections: config.max_connections,
        }
    }

    /// Accept a new connection, respecting the admission limit. Waits for a
    /// free slot before touching the accept queue. The returned permit must
    /// be held for the connection's lifetime.
    pub async fn accept(&self) -> std::io::Result<(TcpStream, SocketAddr, ConnectionPermit)> {
        let permit = self
            .connection_limit
            .clone()
            .acquire_owned()
            .await
            .expect("admission semaphore closed");

        let (stream, addr) = self.inner.accept().await?;

        tracing::trace!(
            peer_addr = %addr,
            available_permits = self.connection_limit.available_permits(),
            "connection accepted"
        );

        Ok((stream, addr, ConnectionPermit { _permit: permit }))
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    pub fn available_permits(&self) -> usize {
        self.connection_limit.available_permits()
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }
}

/// A connection slot. Dropping it releases the slot back to the listener,
/// even if the connection task panics.
#[derive(Debug)]
pub struct ConnectionPermit {
    _permit: tokio::sync::OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config(max_connections: usize) -> ListenerConfig {
        ListenerConfig {
            bind_address: "127.0.0.1".to_string(),
            port: 0,
            max_connections,
            ..ListenerConfig::default()
        }
    }

    #[tokio::test]
    async fn permits_bound_concurrent_accepts() {
        let listener = Listener::bind(&local_config(2)).await;
        let addr = listener.local_addr().unwrap();

        let c1 = TcpStream::connect(addr).await.unwrap();
        let c2 = TcpStream::connect(addr).await.unwrap();
        let (_s1, _, p1) = listener.accept().await.unwrap();
        let (_s2, _, _p2) = listener.accept().await.unwrap();
        assert_eq!(listener.available_permits(), 0);

        drop(p1);
        assert_eq!(listener.available_permits(), 1);
        drop(c1);
        drop(c2);
    }
}
