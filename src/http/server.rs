//! Server assembly and the accept loop.

use std::sync::Arc;

use crate::config::ServerConfig;
use crate::http::clock::{Clock, SystemClock};
use crate::http::conn::ConnectionHandler;
use crate::net::Listener;
use crate::session::SessionRegistry;

/// Owns the session registry and spawns one handler task per accepted
/// connection.
pub struct Server {
    config: Arc<ServerConfig>,
    registry: Arc<SessionRegistry>,
    clock: Arc<dyn Clock>,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        let registry = Arc::new(SessionRegistry::new(
            config.statics.template.clone(),
            config.session.idle_expiry_secs,
        ));
        Self {
            config: Arc::new(config),
            registry,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn registry(&self) -> Arc<SessionRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Accept loop: wait for an admission slot, accept, sweep idle
    /// sessions, spawn. Sweeping is deliberately coupled to connection
    /// arrival; an idle server keeps stale sessions until the next visitor,
    /// which is harmless. It runs between accept and spawn so the arriving
    /// connection sees a freshly screened registry.
    pub async fn run(self, listener: Listener) -> std::io::Result<()> {
        loop {
            let (stream, peer, permit) = listener.accept().await?;
            self.registry.sweep();
            let handler = ConnectionHandler::new(
                stream,
                peer,
                Arc::clone(&self.registry),
                Arc::clone(&self.config),
                Arc::clone(&self.clock),
            );
            tokio::spawn(async move {
                handler.run().await;
                drop(permit);
            });
        }
    }
}
