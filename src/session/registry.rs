//! Concurrent session registry and the event/snapshot operations.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;

use crate::canvas::{Canvas, CLICK_MARK_DIAMETER};
use crate::observability::metrics;
use crate::session::{unix_now, EventKind, Session, SENTINEL_POINT};

/// Thread-safe id → session mapping.
///
/// The dashmap's sharded locks stand in for the structure lock: they are
/// held only while inserting, deleting or scanning entries, never across a
/// canvas operation.
pub struct SessionRegistry {
    sessions: DashMap<u32, Arc<Session>>,
    /// PNG every fresh canvas is cloned from.
    template: PathBuf,
    /// Idle seconds before the sweep discards a session.
    idle_expiry_secs: u64,
}

impl SessionRegistry {
    pub fn new(template: PathBuf, idle_expiry_secs: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            template,
            idle_expiry_secs,
        }
    }

    /// Look up a session, creating it if absent. Creation is idempotent:
    /// concurrent callers racing on the same id land on the same entry.
    pub fn find_or_create(&self, id: u32) -> Arc<Session> {
        let session = self
            .sessions
            .entry(id)
            .or_insert_with(|| {
                tracing::debug!(session_id = id, "session created");
                Arc::new(Session::new(id, unix_now()))
            })
            .clone();
        metrics::set_sessions_active(self.sessions.len());
        session
    }

    /// Look up only; image fetches never create sessions.
    pub fn find(&self, id: u32) -> Option<Arc<Session>> {
        self.sessions.get(&id).map(|entry| entry.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Unlink every session idle past the expiry threshold. Invoked once per
    /// accepted connection; canvas memory is reclaimed when the last Arc
    /// reference drops, so an in-flight snapshot can still finish.
    pub fn sweep(&self) {
        let now = unix_now();
        let limit = self.idle_expiry_secs;
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| now.saturating_sub(session.last_activity()) <= limit);
        let after = self.sessions.len();
        if after < before {
            tracing::info!(expired = before - after, remaining = after, "idle sessions swept");
        }
        metrics::set_sessions_active(after);
    }

    /// Process one pointer event: lazily create the canvas, draw the
    /// connecting line and (for clicks) the mark, and record the new point.
    ///
    /// A template that fails to load is tolerated silently: no drawing
    /// happens this round, but the point is still recorded and activity is
    /// still stamped.
    pub async fn handle_event(&self, id: u32, x: u16, y: u16, kind: EventKind) {
        let session = self.find_or_create(id);
        {
            let mut state = session.state.lock().await;

            if state.canvas.is_none() {
                match Canvas::from_template(&self.template) {
                    Ok(canvas) => state.canvas = Some(canvas),
                    Err(err) => tracing::debug!(
                        session_id = id,
                        error = %err,
                        "canvas template unavailable; event recorded without drawing"
                    ),
                }
            }

            let prior = state.last_point;
            if let Some(canvas) = state.canvas.as_mut() {
                if prior != SENTINEL_POINT {
                    canvas.draw_line_aa(prior.0 as i32, prior.1 as i32, x as i32, y as i32);
                }
                if kind == EventKind::Click {
                    canvas.fill_disc(x as i32, y as i32, CLICK_MARK_DIAMETER);
                }
            }

            state.last_point = (x, y);
        }
        session.touch(unix_now());
    }

    /// Encode an existing session's canvas to PNG. Returns None both for an
    /// unknown id and for a session whose canvas never loaded; callers map
    /// either to the one generic error response.
    pub async fn snapshot_png(&self, id: u32) -> Option<Vec<u8>> {
        let session = self.find(id)?;
        let state = session.state.lock().await;
        let canvas = state.canvas.as_ref()?;
        match canvas.encode_png() {
            Ok(bytes) => Some(bytes),
            Err(err) => {
                tracing::warn!(session_id = id, error = %err, "PNG encode failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_without_template() -> SessionRegistry {
        SessionRegistry::new(PathBuf::from("/nonexistent/blank.png"), 300)
    }

    #[test]
    fn find_or_create_is_idempotent() {
        let registry = registry_without_template();
        let a = registry.find_or_create(7);
        let b = registry.find_or_create(7);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn find_never_creates() {
        let registry = registry_without_template();
        assert!(registry.find(42).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn sweep_unlinks_only_idle_sessions() {
        let registry = registry_without_template();
        let stale = registry.find_or_create(1);
        let fresh = registry.find_or_create(2);
        stale.touch(0);
        fresh.touch(unix_now());

        registry.sweep();
        assert!(registry.find(1).is_none());
        assert!(registry.find(2).is_some());
    }

    #[tokio::test]
    async fn event_without_template_still_records_point() {
        let registry = registry_without_template();
        registry.handle_event(9, 10, 20, EventKind::Move).await;

        let session = registry.find(9).unwrap();
        let state = session.state.lock().await;
        assert!(state.canvas.is_none());
        assert_eq!(state.last_point, (10, 20));
    }

    #[tokio::test]
    async fn snapshot_of_canvasless_session_is_none() {
        let registry = registry_without_template();
        registry.handle_event(9, 10, 20, EventKind::Move).await;
        assert!(registry.snapshot_png(9).await.is_none());
        assert!(registry.snapshot_png(12345).await.is_none());
    }

    #[tokio::test]
    async fn events_update_activity_stamp() {
        let registry = registry_without_template();
        registry.handle_event(3, 1, 1, EventKind::Click).await;
        let session = registry.find(3).unwrap();
        assert!(session.last_activity() > 0);
    }
}
