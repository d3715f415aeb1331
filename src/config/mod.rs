//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → ServerConfig (validated, immutable)
//!     → shared via Arc with the server and every connection task
//!
//! CLI overrides (a single optional port argument) are applied by main
//! after loading, before the config is frozen.
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload path
//! - All fields have defaults so the server runs with no config file at all
//! - The positional port argument wins over the file, so `webdraw 8013`
//!   keeps working without any config at all

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigError};
pub use schema::{ListenerConfig, ObservabilityConfig, ServerConfig, SessionConfig, StaticConfig};
