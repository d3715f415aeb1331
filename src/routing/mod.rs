//! Request routing.
//!
//! # Data Flow
//! ```text
//! parsed Request.path
//!     → route() (exact-prefix dispatch, first match wins)
//!     → RouteAction: event / image fetch / static asset / bad event / 404
//! ```
//!
//! # Design Decisions
//! - Fixed precedence, no tables: event routes, then dynamic image, then a
//!   closed set of static names, then 404
//! - The `?` suffix is raw text, split on commas by the event arg parser,
//!   never decoded as key/value pairs
//! - An /event/ path with an unknown verb or bad args is a 500, not
//!   a 404 and not a connection abort

mod router;

pub use router::{parse_event_args, parse_image_args, route, EventArgs, RouteAction, StaticAsset};
