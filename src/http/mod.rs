//! Hand-rolled HTTP/1.x layer.
//!
//! # Data Flow
//! ```text
//! accepted TcpStream
//!     → conn.rs (per-connection state machine, keep-alive, pipelining)
//!     → request.rs (buffer framing + request parsing)
//!     → routing (dispatch)
//!     → response.rs (status/header framing, memory or file bodies)
//! ```
//!
//! # Design Decisions
//! - No HTTP library: framing is a double-CRLF scan over an append-only
//!   buffer, which is the point of this server
//! - GET only, no bodies, no chunked encoding
//! - A parse failure below the request level (bad method, corrupt header)
//!   kills the connection, not just the request

pub mod clock;
pub mod conn;
pub mod request;
pub mod response;
pub mod server;

pub use clock::{Clock, SystemClock};
pub use conn::ConnectionHandler;
pub use request::{parse_request, Request, RequestBuffer};
pub use response::{Body, Response, ResponseWriter};
pub use server::Server;
