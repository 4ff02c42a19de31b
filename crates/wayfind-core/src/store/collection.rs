// ── Generic reactive resource collection ──
//
// Lock-free concurrent storage keyed by resource fingerprints, with
// push-based change notification via `watch` channels.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

/// A lock-free, reactive collection for a single resource type.
///
/// Keys are [`ResourceKey`](crate::model::ResourceKey) fingerprints, so
/// the same resource seen across refetches lands on the same entry.
/// Every mutation bumps a version counter and rebuilds the snapshot
/// that subscribers receive.
pub(crate) struct ResourceCollection<T: Clone + Send + Sync + 'static> {
    by_key: DashMap<String, Arc<T>>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full snapshot, rebuilt on mutation for efficient subscription.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> ResourceCollection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_key: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Insert or update a resource. Returns `true` if the key was new.
    pub(crate) fn upsert(&self, key: String, resource: T) -> bool {
        let is_new = !self.by_key.contains_key(&key);
        self.by_key.insert(key, Arc::new(resource));

        self.rebuild_snapshot();
        self.bump_version();

        is_new
    }

    /// Replace the whole collection with a fresh listing. Entries absent
    /// from the listing are dropped, so deletions show up after a
    /// refetch without tombstone bookkeeping.
    pub(crate) fn replace_all(&self, items: impl IntoIterator<Item = (String, T)>) {
        self.by_key.clear();
        for (key, item) in items {
            self.by_key.insert(key, Arc::new(item));
        }
        self.rebuild_snapshot();
        self.bump_version();
    }

    /// Remove a resource by fingerprint. Returns it if it existed.
    pub(crate) fn remove(&self, key: &str) -> Option<Arc<T>> {
        let removed = self.by_key.remove(key).map(|(_, v)| v);
        if removed.is_some() {
            self.rebuild_snapshot();
            self.bump_version();
        }
        removed
    }

    pub(crate) fn get(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    #[allow(dead_code)]
    pub(crate) fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Collect all values into a snapshot vec and broadcast to subscribers.
    fn rebuild_snapshot(&self) {
        let values: Vec<Arc<T>> = self.by_key.iter().map(|r| Arc::clone(r.value())).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }

    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn upsert_returns_true_for_new_key() {
        let col: ResourceCollection<String> = ResourceCollection::new();
        assert!(col.upsert("dc1:default:default:web".into(), "hello".into()));
    }

    #[test]
    fn upsert_returns_false_for_existing_key() {
        let col: ResourceCollection<String> = ResourceCollection::new();
        col.upsert("k".into(), "hello".into());
        assert!(!col.upsert("k".into(), "world".into()));
        assert_eq!(*col.get("k").unwrap(), "world");
    }

    #[test]
    fn remove_drops_the_entry() {
        let col: ResourceCollection<String> = ResourceCollection::new();
        col.upsert("k".into(), "hello".into());

        let removed = col.remove("k");
        assert_eq!(*removed.unwrap(), "hello");
        assert!(col.get("k").is_none());
        assert!(col.is_empty());
    }

    #[test]
    fn replace_all_drops_absent_entries() {
        let col: ResourceCollection<String> = ResourceCollection::new();
        col.upsert("a".into(), "x".into());
        col.upsert("b".into(), "y".into());

        col.replace_all(vec![("b".into(), "y2".into()), ("c".into(), "z".into())]);

        assert!(col.get("a").is_none());
        assert_eq!(*col.get("b").unwrap(), "y2");
        assert_eq!(*col.get("c").unwrap(), "z");
        assert_eq!(col.len(), 2);
    }

    #[test]
    fn snapshot_reflects_current_state() {
        let col: ResourceCollection<String> = ResourceCollection::new();
        assert!(col.snapshot().is_empty());

        col.upsert("a".into(), "x".into());
        col.upsert("b".into(), "y".into());
        assert_eq!(col.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn subscribers_see_mutations() {
        let col: ResourceCollection<String> = ResourceCollection::new();
        let mut rx = col.subscribe();

        col.upsert("a".into(), "x".into());
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        col.remove("a");
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }
}
