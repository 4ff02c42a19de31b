// ── Persisted console settings ──
//
// Settings survive restarts in a TOML file and broadcast changes to
// subscribers through a `watch` channel. A watcher can be closed and
// later reopened; while closed it receives nothing, and after reopening
// it resumes on the next change rather than replaying missed ones.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use crate::ConfigError;

/// Console settings persisted across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Preferred datacenter; `None` means the agent's own.
    pub datacenter: Option<String>,
    pub namespace: Option<String>,
    pub partition: Option<String>,
    /// Whether subscriptions use server-side blocking queries.
    pub blocking: bool,
    /// Server-side hold bound for blocking queries, in seconds.
    pub wait_secs: u64,
    /// Fetch cadence when blocking is disabled, in seconds.
    pub poll_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            datacenter: None,
            namespace: None,
            partition: None,
            blocking: true,
            wait_secs: 300,
            poll_interval_secs: 10,
        }
    }
}

// ── Store ────────────────────────────────────────────────────────────

/// Persisted settings with change notification.
///
/// Cheaply cloneable; every clone shares the same file and channel.
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    path: PathBuf,
    current: watch::Sender<Settings>,
}

impl SettingsStore {
    /// Open the store at `path`, loading existing settings or starting
    /// from defaults when the file is missing or unreadable.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = std::fs::read_to_string(&path)
            .ok()
            .and_then(|raw| toml::from_str(&raw).ok())
            .unwrap_or_default();

        let (current, _) = watch::channel(settings);
        Self {
            inner: Arc::new(StoreInner { path, current }),
        }
    }

    /// Current settings snapshot.
    pub fn get(&self) -> Settings {
        self.inner.current.borrow().clone()
    }

    /// Mutate the settings, persist them, and notify subscribers.
    pub fn update<F>(&self, f: F) -> Result<Settings, ConfigError>
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.get();
        f(&mut settings);
        self.persist(&settings)?;

        self.inner.current.send_replace(settings.clone());
        debug!(path = %self.inner.path.display(), "settings updated");
        Ok(settings)
    }

    /// Subscribe to settings changes. The watcher starts open.
    pub fn subscribe(&self) -> SettingsWatcher {
        SettingsWatcher {
            receiver: Some(self.inner.current.subscribe()),
        }
    }

    fn persist(&self, settings: &Settings) -> Result<(), ConfigError> {
        if let Some(parent) = self.inner.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = toml::to_string_pretty(settings)?;
        std::fs::write(&self.inner.path, raw)?;
        Ok(())
    }
}

// ── Watcher ──────────────────────────────────────────────────────────

/// A subscription to settings changes with an explicit open/close
/// lifecycle.
pub struct SettingsWatcher {
    receiver: Option<watch::Receiver<Settings>>,
}

impl SettingsWatcher {
    /// Wait for the next settings change. Returns `None` immediately
    /// while the watcher is closed, or once the store is gone.
    pub async fn changed(&mut self) -> Option<Settings> {
        let receiver = self.receiver.as_mut()?;
        receiver.changed().await.ok()?;
        Some(receiver.borrow_and_update().clone())
    }

    /// Stop receiving changes. Idempotent.
    pub fn close(&mut self) {
        self.receiver = None;
    }

    /// Re-register with the store. The current value counts as seen, so
    /// dispatch resumes on the next change; updates made while closed
    /// are not replayed.
    pub fn reopen(&mut self, store: &SettingsStore) {
        let mut receiver = store.inner.current.subscribe();
        receiver.mark_unchanged();
        self.receiver = Some(receiver);
    }

    pub fn is_open(&self) -> bool {
        self.receiver.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store_in(dir: &tempfile::TempDir) -> SettingsStore {
        SettingsStore::open(dir.path().join("settings.toml"))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        assert_eq!(store.get(), Settings::default());
    }

    #[test]
    fn update_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let store = SettingsStore::open(&path);
        store
            .update(|s| {
                s.blocking = false;
                s.datacenter = Some("dc2".into());
            })
            .unwrap();

        let reloaded = SettingsStore::open(&path);
        assert!(!reloaded.get().blocking);
        assert_eq!(reloaded.get().datacenter.as_deref(), Some("dc2"));
    }

    #[tokio::test]
    async fn watcher_sees_updates() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut watcher = store.subscribe();

        store.update(|s| s.blocking = false).unwrap();

        let settings = watcher.changed().await.unwrap();
        assert!(!settings.blocking);
    }

    #[tokio::test]
    async fn closed_watcher_receives_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut watcher = store.subscribe();

        watcher.close();
        store.update(|s| s.blocking = false).unwrap();

        assert!(!watcher.is_open());
        assert!(watcher.changed().await.is_none());
    }

    #[tokio::test]
    async fn reopened_watcher_resumes_on_next_change() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let mut watcher = store.subscribe();

        // Change made while closed is not replayed.
        watcher.close();
        store.update(|s| s.wait_secs = 60).unwrap();

        watcher.reopen(&store);
        assert!(watcher.is_open());

        // Only the post-reopen change dispatches.
        store.update(|s| s.wait_secs = 90).unwrap();
        let settings = watcher.changed().await.unwrap();
        assert_eq!(settings.wait_secs, 90);
    }
}
