//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! /event/* request
//!     → registry.find_or_create(id)   (structure locks: dashmap shards)
//!     → session.state.lock()          (per-session draw lock)
//!     → canvas create / line / mark
//!     → unlock, touch last_activity
//!
//! /dynamic/image request
//!     → registry.find(id)             (never creates)
//!     → lock, encode PNG, unlock
//!
//! accept loop → registry.sweep()      (unlink idle sessions)
//! ```
//!
//! # Design Decisions
//! - Two independent lock scopes: the sharded map guards only insert/delete
//!   of entries, the per-session mutex guards canvas + last point together.
//!   Neither is ever held while waiting on the other.
//! - Sessions are `Arc`-owned, so an unlinked session still being drawn to
//!   or encoded finishes safely; its canvas is freed with the last clone.
//! - `last_activity` is a plain atomic written after the draw lock is
//!   released, on every event, draw success or not.

mod registry;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::Mutex;

use crate::canvas::Canvas;

pub use registry::SessionRegistry;

/// "No prior point recorded" marker for a fresh session.
pub const SENTINEL_POINT: (u16, u16) = (65535, 65535);

/// Pointer event kinds accepted by the event routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Pointer moved; draws a connecting line when a prior point exists.
    Move,
    /// Pointer clicked; additionally draws a small filled mark.
    Click,
}

/// State guarded by the per-session draw lock, as one unit.
pub(crate) struct DrawState {
    /// None until the first event manages to load the template.
    pub(crate) canvas: Option<Canvas>,
    /// Previous pointer position, or the sentinel.
    pub(crate) last_point: (u16, u16),
}

/// Server-side state for one drawing client.
pub struct Session {
    id: u32,
    pub(crate) state: Mutex<DrawState>,
    /// Seconds since the Unix epoch; read by the sweep without any lock.
    last_activity: AtomicU64,
}

impl Session {
    fn new(id: u32, now: u64) -> Self {
        Self {
            id,
            state: Mutex::new(DrawState {
                canvas: None,
                last_point: SENTINEL_POINT,
            }),
            last_activity: AtomicU64::new(now),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Record activity. Relaxed ordering is enough: the sweep only needs an
    /// eventually-visible coarse timestamp, not synchronization.
    pub fn touch(&self, now: u64) {
        self.last_activity.store(now, Ordering::Relaxed);
    }

    pub fn last_activity(&self) -> u64 {
        self.last_activity.load(Ordering::Relaxed)
    }
}

/// Coarse wall-clock seconds for activity stamps.
pub(crate) fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
