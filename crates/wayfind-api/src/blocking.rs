// ── Blocking-query cursor state ──
//
// Tracks the last-seen cursor for one subscription and decides how the
// next fetch is issued: blocking (cursor + wait attached), or plain.
// The watch loop owns one CursorState per subscription.

use std::time::Duration;

use crate::query::{QueryMeta, QueryOptions};

/// What a response's metadata says about continuing the subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorOutcome {
    /// A cursor was returned; the next fetch can block on it.
    Watchable,
    /// No cursor in the response: the endpoint does not support blocking
    /// queries and the subscription must close.
    NotWatchable,
}

/// Per-subscription cursor tracking.
///
/// Invariant: holds at most one cursor. After a transport failure the
/// cursor is cleared so the resumed fetch is non-blocking.
#[derive(Debug, Clone)]
pub struct CursorState {
    blocking: bool,
    wait: Duration,
    cursor: Option<crate::query::Cursor>,
}

impl CursorState {
    pub fn new(blocking: bool, wait: Duration) -> Self {
        Self {
            blocking,
            wait,
            cursor: None,
        }
    }

    /// Attach the stored cursor (and wait bound) to the outgoing options.
    ///
    /// With blocking disabled, or before the first response, nothing is
    /// attached and the fetch returns immediately.
    pub fn prepare(&self, opts: &mut QueryOptions) {
        if self.blocking {
            if let Some(ref cursor) = self.cursor {
                opts.index = Some(cursor.clone());
                opts.wait = Some(self.wait);
            }
        }
    }

    /// Record the cursor from a successful response.
    pub fn absorb(&mut self, meta: &QueryMeta) -> CursorOutcome {
        match meta.index {
            Some(ref cursor) => {
                self.cursor = Some(cursor.clone());
                CursorOutcome::Watchable
            }
            None => {
                self.cursor = None;
                CursorOutcome::NotWatchable
            }
        }
    }

    /// Drop the cursor so the next fetch is non-blocking. Applied by the
    /// restart policy after a transport failure.
    pub fn clear(&mut self) {
        self.cursor = None;
    }

    pub fn cursor(&self) -> Option<&crate::query::Cursor> {
        self.cursor.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Cursor;

    fn meta_with(index: Option<&str>) -> QueryMeta {
        QueryMeta {
            index: index.and_then(Cursor::new),
            ..QueryMeta::default()
        }
    }

    #[test]
    fn first_fetch_is_plain() {
        let state = CursorState::new(true, Duration::from_secs(300));
        let mut opts = QueryOptions::default();
        state.prepare(&mut opts);
        assert!(opts.index.is_none());
        assert!(opts.wait.is_none());
    }

    #[test]
    fn absorbed_cursor_is_attached_next_time() {
        let mut state = CursorState::new(true, Duration::from_secs(300));
        assert_eq!(state.absorb(&meta_with(Some("5"))), CursorOutcome::Watchable);

        let mut opts = QueryOptions::default();
        state.prepare(&mut opts);
        assert_eq!(opts.index, Cursor::new("5"));
        assert_eq!(opts.wait, Some(Duration::from_secs(300)));
    }

    #[test]
    fn missing_cursor_means_not_watchable() {
        let mut state = CursorState::new(true, Duration::from_secs(300));
        state.absorb(&meta_with(Some("5")));
        assert_eq!(state.absorb(&meta_with(None)), CursorOutcome::NotWatchable);
        assert!(state.cursor().is_none());
    }

    #[test]
    fn non_blocking_never_attaches_cursor() {
        let mut state = CursorState::new(false, Duration::from_secs(300));
        state.absorb(&meta_with(Some("5")));

        let mut opts = QueryOptions::default();
        state.prepare(&mut opts);
        assert!(opts.index.is_none());
    }

    #[test]
    fn clear_forces_plain_fetch() {
        let mut state = CursorState::new(true, Duration::from_secs(300));
        state.absorb(&meta_with(Some("5")));
        state.clear();

        let mut opts = QueryOptions::default();
        state.prepare(&mut opts);
        assert!(opts.index.is_none());
    }
}
