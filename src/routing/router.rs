//! Path dispatch and event argument parsing.

use std::path::{Path, PathBuf};

use crate::session::EventKind;

/// The closed set of static resources this server offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticAsset {
    /// The drawing page.
    Page,
    /// The test harness page.
    PageTest,
    /// The blank canvas template.
    BlankPng,
    /// The server's own source listing.
    SourceListing,
}

impl StaticAsset {
    pub fn content_type(self) -> &'static str {
        match self {
            StaticAsset::Page | StaticAsset::PageTest => "text/html",
            StaticAsset::BlankPng => "image/png",
            StaticAsset::SourceListing => "text/plain",
        }
    }

    /// On-disk location. Pages and the template live in the static dir; the
    /// source listing is the server's own entry point in the source tree.
    pub fn resolve(self, static_dir: &Path) -> PathBuf {
        match self {
            StaticAsset::Page => static_dir.join("page.html"),
            StaticAsset::PageTest => static_dir.join("page-test.html"),
            StaticAsset::BlankPng => static_dir.join("blank.png"),
            StaticAsset::SourceListing => PathBuf::from("src/main.rs"),
        }
    }
}

/// What a request's path resolves to.
#[derive(Debug, PartialEq, Eq)]
pub enum RouteAction {
    /// A move/click event with its raw `id,x,y` suffix.
    Event { kind: EventKind, args: String },
    /// A canvas snapshot with its raw session-id suffix.
    Image { args: String },
    /// One of the fixed static resources.
    Static(StaticAsset),
    /// An /event/ path that matches no event verb; answered with the
    /// generic 500 rather than a 404.
    BadEvent,
    /// Everything else.
    NotFound,
}

/// Exact-prefix dispatch, first match wins.
pub fn route(path: &str) -> RouteAction {
    if let Some(rest) = path.strip_prefix("/event/") {
        if let Some(args) = rest.strip_prefix("move?") {
            return RouteAction::Event {
                kind: EventKind::Move,
                args: args.to_string(),
            };
        }
        if let Some(args) = rest.strip_prefix("click?") {
            return RouteAction::Event {
                kind: EventKind::Click,
                args: args.to_string(),
            };
        }
        return RouteAction::BadEvent;
    }
    if let Some(args) = path.strip_prefix("/dynamic/image?") {
        return RouteAction::Image {
            args: args.to_string(),
        };
    }
    match path {
        "/static/page.html" => RouteAction::Static(StaticAsset::Page),
        "/static/page-test.html" => RouteAction::Static(StaticAsset::PageTest),
        "/static/blank.png" => RouteAction::Static(StaticAsset::BlankPng),
        "/static/main.rs" => RouteAction::Static(StaticAsset::SourceListing),
        _ => RouteAction::NotFound,
    }
}

/// Parsed `id,x,y` event suffix.
#[derive(Debug, PartialEq, Eq)]
pub struct EventArgs {
    pub id: u32,
    pub x: u16,
    pub y: u16,
}

/// Parse a comma-separated `id,x,y` suffix. Any missing field, stray text
/// or out-of-range number is a request-recoverable failure (the generic
/// 500), never a connection abort.
pub fn parse_event_args(args: &str) -> Option<EventArgs> {
    let mut fields = args.splitn(3, ',');
    let id = fields.next()?.parse().ok()?;
    let x = fields.next()?.parse().ok()?;
    let y = fields.next()?.parse().ok()?;
    Some(EventArgs { id, x, y })
}

/// Parse the session-id suffix of an image fetch.
pub fn parse_image_args(args: &str) -> Option<u32> {
    args.parse().ok()
}
