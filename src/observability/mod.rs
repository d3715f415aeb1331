//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (structured, stdout via the fmt subscriber)
//!     → metrics.rs (counters, gauges)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Metric updates are cheap atomic operations and always on; only the
//!   scrape endpoint is config-gated
//! - Status code is the single request label; this server has no routes
//!   worth higher cardinality

pub mod metrics;
