//! Per-connection control loop.
//!
//! # Responsibilities
//! - Read socket bytes into the request buffer until a frame boundary
//! - Parse, route and execute exactly one request at a time
//! - Send the response and honor keep-alive / pipelining
//! - Tear down on any connection-fatal error
//!
//! The loop is an explicit state machine:
//! ```text
//! Reading → Dispatching → Responding → Reading (keep-alive)
//!     ↘ Closed ←──────────────────────↙ (close flag, fatal error, EOF)
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use crate::config::ServerConfig;
use crate::error::ConnectionError;
use crate::http::clock::Clock;
use crate::http::request::{parse_request, Request, RequestBuffer};
use crate::http::response::{Response, ResponseWriter};
use crate::net::connection::ConnectionId;
use crate::observability::metrics;
use crate::routing::{self, RouteAction};
use crate::session::SessionRegistry;

/// Read granularity; the request buffer imposes the real cap.
const READ_CHUNK: usize = 4096;

enum ConnState {
    Reading,
    Dispatching {
        frame_end: usize,
    },
    Responding {
        response: Response,
        version: String,
        close: bool,
        frame_end: usize,
    },
    Closed,
}

/// Owns one accepted socket for its whole life.
pub struct ConnectionHandler {
    stream: TcpStream,
    peer: SocketAddr,
    id: ConnectionId,
    buffer: RequestBuffer,
    registry: Arc<SessionRegistry>,
    config: Arc<ServerConfig>,
    clock: Arc<dyn Clock>,
}

impl ConnectionHandler {
    pub fn new(
        stream: TcpStream,
        peer: SocketAddr,
        registry: Arc<SessionRegistry>,
        config: Arc<ServerConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let buffer = RequestBuffer::with_capacity(config.listener.request_buffer_bytes);
        Self {
            stream,
            peer,
            id: ConnectionId::new(),
            buffer,
            registry,
            config,
            clock,
        }
    }

    /// Drive the connection to completion. Fatal errors are logged, never
    /// propagated; the socket closes on drop either way.
    pub async fn run(mut self) {
        metrics::connection_opened();
        tracing::debug!(conn = %self.id, peer = %self.peer, "connection open");
        match self.serve().await {
            Ok(()) => tracing::debug!(conn = %self.id, "connection closed"),
            Err(err) => tracing::debug!(conn = %self.id, error = %err, "connection aborted"),
        }
        metrics::connection_closed();
    }

    async fn serve(&mut self) -> Result<(), ConnectionError> {
        let mut state = ConnState::Reading;
        loop {
            state = match state {
                ConnState::Reading => match self.read_until_frame().await? {
                    Some(frame_end) => ConnState::Dispatching { frame_end },
                    None => ConnState::Closed,
                },
                ConnState::Dispatching { frame_end } => {
                    let request = parse_request(&self.buffer.as_slice()[..frame_end])?;
                    tracing::debug!(
                        conn = %self.id,
                        path = %request.path,
                        version = %request.version,
                        "request"
                    );
                    let response = self.dispatch(&request).await;
                    ConnState::Responding {
                        response,
                        version: request.version,
                        close: request.close,
                        frame_end,
                    }
                }
                ConnState::Responding {
                    response,
                    version,
                    close,
                    frame_end,
                } => {
                    let status = response.status;
                    let writer = ResponseWriter::new(self.clock.as_ref());
                    writer
                        .write(&mut self.stream, &version, close, response)
                        .await?;
                    metrics::record_request(status);
                    if close {
                        ConnState::Closed
                    } else {
                        // Keep any pipelined remainder for the next cycle.
                        self.buffer.consume(frame_end);
                        ConnState::Reading
                    }
                }
                ConnState::Closed => break,
            };
        }
        Ok(())
    }

    /// Fill the buffer until a complete header block is present. A buffered
    /// pipelined request is served without touching the socket. Returns None
    /// on EOF.
    async fn read_until_frame(&mut self) -> Result<Option<usize>, ConnectionError> {
        loop {
            if let Some(end) = self.buffer.find_frame() {
                return Ok(Some(end));
            }
            if self.buffer.remaining_capacity() == 0 {
                return Err(ConnectionError::BufferOverflow(
                    self.config.listener.request_buffer_bytes,
                ));
            }
            // Read at most what the buffer can still hold, so a request
            // that fits exactly is still served.
            let mut chunk = [0u8; READ_CHUNK];
            let want = READ_CHUNK.min(self.buffer.remaining_capacity());
            let read = tokio::time::timeout(
                Duration::from_secs(self.config.listener.read_timeout_secs),
                self.stream.read(&mut chunk[..want]),
            )
            .await
            .map_err(|_| ConnectionError::ReadTimeout)?;
            let n = read?;
            if n == 0 {
                if !self.buffer.is_empty() {
                    tracing::debug!(conn = %self.id, "EOF mid-request");
                }
                return Ok(None);
            }
            self.buffer.push(&chunk[..n])?;
        }
    }

    async fn dispatch(&self, request: &Request) -> Response {
        match routing::route(&request.path) {
            RouteAction::Event { kind, args } => match routing::parse_event_args(&args) {
                Some(ev) => {
                    self.registry.handle_event(ev.id, ev.x, ev.y, kind).await;
                    Response::ok_empty()
                }
                None => Response::event_error(),
            },
            RouteAction::Image { args } => match routing::parse_image_args(&args) {
                Some(id) => match self.registry.snapshot_png(id).await {
                    Some(bytes) => Response::png(bytes),
                    None => Response::event_error(),
                },
                None => Response::event_error(),
            },
            RouteAction::Static(asset) => Response::file(
                asset.resolve(&self.config.statics.dir),
                asset.content_type(),
            ),
            RouteAction::BadEvent => Response::event_error(),
            RouteAction::NotFound => Response::not_found(),
        }
    }
}
