//! Shared drawing-canvas HTTP backend.
//!
//! Browsers send pointer move/click events as GET requests; the server
//! draws them into a per-session canvas and serves PNG snapshots. The
//! HTTP/1.x layer (framing, keep-alive, pipelining) is hand-rolled over raw
//! TCP sockets, one task per connection, against a concurrently-shared
//! session registry.

// Core subsystems
pub mod canvas;
pub mod config;
pub mod error;
pub mod http;
pub mod net;
pub mod routing;
pub mod session;

// Cross-cutting concerns
pub mod observability;

pub use config::ServerConfig;
pub use http::Server;
pub use net::Listener;
pub use session::SessionRegistry;
