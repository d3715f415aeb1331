//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind-with-retry, accept loop, admission limit)
//!     → connection.rs (connection ids for tracing)
//!     → Hand off to the HTTP layer
//! ```
//!
//! # Design Decisions
//! - One task per connection, gated by a semaphore: the accept loop blocks
//!   when every slot is taken instead of spawning without bound
//! - Binding retries forever with a delay, so the server survives a
//!   lingering socket from a previous instance
//! - Accept failures are surfaced to the caller, which treats them as fatal

pub mod connection;
pub mod listener;

pub use connection::ConnectionId;
pub use listener::{ConnectionPermit, Listener};
