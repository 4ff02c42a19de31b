// ── Console abstraction ──
//
// Entry point for consumers: owns the HTTP client, the reactive store,
// and the cancellation scope shared by all live watch subscriptions.
// Flipping the blocking toggle tears the whole subscription set down;
// callers re-subscribe under the new mode.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use wayfind_api::http::ConnectionTally;
use wayfind_api::HttpClient;

use crate::config::ConsoleConfig;
use crate::error::CoreError;
use crate::repo::{
    DatacenterRepo, IntentionRepo, KvRepo, NodeRepo, PolicyRepo, RoleRepo, ServiceRepo,
    SessionRepo, TokenRepo,
};
use crate::store::DataStore;

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc`. Repositories are lightweight façades
/// built on demand; they share the client, the store, and the current
/// watch scope.
#[derive(Clone)]
pub struct Console {
    inner: Arc<ConsoleInner>,
}

struct ConsoleInner {
    config: ConsoleConfig,
    client: HttpClient,
    store: Arc<DataStore>,
    blocking: AtomicBool,
    /// Effective local datacenter, resolved at connect time.
    datacenter: RwLock<String>,
    /// Parent token for every live subscription. Swapped (and the old
    /// one cancelled) when the blocking toggle flips.
    watch_scope: Mutex<CancellationToken>,
    cancel: CancellationToken,
}

impl Console {
    /// Build a Console from configuration. Does NOT touch the network;
    /// call [`connect()`](Self::connect) to verify reachability.
    pub fn new(config: ConsoleConfig) -> Result<Self, CoreError> {
        let client = HttpClient::new(&config.server, config.token.clone(), &config.transport())?;
        let blocking = AtomicBool::new(config.blocking);
        let datacenter = RwLock::new(config.datacenter.clone().unwrap_or_default());

        Ok(Self {
            inner: Arc::new(ConsoleInner {
                config,
                client,
                store: Arc::new(DataStore::new()),
                blocking,
                datacenter,
                watch_scope: Mutex::new(CancellationToken::new()),
                cancel: CancellationToken::new(),
            }),
        })
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────────

    /// Verify the agent is reachable and resolve the local datacenter.
    ///
    /// The datacenter listing is the cheapest authenticated read the
    /// control plane offers; its first entry is the agent's own
    /// datacenter unless the configuration pins one.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let dcs = self.inner.client.list_datacenters().await?;
        self.inner.store.set_datacenters(dcs.clone());

        let local = match self.inner.config.datacenter {
            Some(ref dc) => dc.clone(),
            None => dcs.first().cloned().unwrap_or_default(),
        };
        *self.write_datacenter() = local.clone();

        info!(datacenter = %local, server = %self.inner.config.server, "connected");
        Ok(())
    }

    /// Cancel every background subscription.
    pub fn close(&self) {
        self.inner.cancel.cancel();
        self.watch_scope().cancel();
        debug!("console closed");
    }

    /// The resolved local datacenter (empty before `connect`).
    pub fn datacenter(&self) -> String {
        self.inner
            .datacenter
            .read()
            .map(|dc| dc.clone())
            .unwrap_or_default()
    }

    // ── Blocking toggle ──────────────────────────────────────────────

    /// Whether new subscriptions use blocking queries.
    pub fn blocking(&self) -> bool {
        self.inner.blocking.load(Ordering::Relaxed)
    }

    /// Flip the blocking toggle and close every live subscription.
    ///
    /// In-flight requests are not aborted; their results are discarded
    /// by the cancelled loops. `tally()` shows how many are still
    /// draining.
    pub fn set_blocking(&self, blocking: bool) {
        let was = self.inner.blocking.swap(blocking, Ordering::Relaxed);
        if was == blocking {
            return;
        }

        let old = {
            let mut guard = self
                .inner
                .watch_scope
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            std::mem::replace(&mut *guard, CancellationToken::new())
        };
        old.cancel();
        info!(blocking, "blocking mode changed, subscriptions closed");
    }

    /// In-flight request counter shared by everything on this client.
    pub fn tally(&self) -> ConnectionTally {
        self.inner.client.tally()
    }

    // ── Repositories ─────────────────────────────────────────────────

    pub fn datacenters(&self) -> DatacenterRepo {
        DatacenterRepo {
            client: self.inner.client.clone(),
            store: Arc::clone(&self.inner.store),
        }
    }

    pub fn nodes(&self) -> NodeRepo {
        NodeRepo {
            client: self.inner.client.clone(),
            store: Arc::clone(&self.inner.store),
            scope: self.inner.config.scope(),
            watch_cfg: self.inner.config.watch_config(self.blocking()),
            watch_scope: self.watch_scope(),
        }
    }

    pub fn services(&self) -> ServiceRepo {
        ServiceRepo {
            client: self.inner.client.clone(),
            store: Arc::clone(&self.inner.store),
            scope: self.inner.config.scope(),
            watch_cfg: self.inner.config.watch_config(self.blocking()),
            watch_scope: self.watch_scope(),
        }
    }

    pub fn kv(&self) -> KvRepo {
        KvRepo {
            client: self.inner.client.clone(),
            store: Arc::clone(&self.inner.store),
            scope: self.inner.config.scope(),
            datacenter: self.datacenter(),
            watch_cfg: self.inner.config.watch_config(self.blocking()),
            watch_scope: self.watch_scope(),
        }
    }

    pub fn tokens(&self) -> TokenRepo {
        TokenRepo {
            client: self.inner.client.clone(),
            store: Arc::clone(&self.inner.store),
            scope: self.inner.config.scope(),
            datacenter: self.datacenter(),
            watch_cfg: self.inner.config.watch_config(self.blocking()),
            watch_scope: self.watch_scope(),
        }
    }

    pub fn policies(&self) -> PolicyRepo {
        PolicyRepo {
            client: self.inner.client.clone(),
            store: Arc::clone(&self.inner.store),
            scope: self.inner.config.scope(),
            datacenter: self.datacenter(),
        }
    }

    pub fn roles(&self) -> RoleRepo {
        RoleRepo {
            client: self.inner.client.clone(),
            store: Arc::clone(&self.inner.store),
            scope: self.inner.config.scope(),
            datacenter: self.datacenter(),
        }
    }

    pub fn intentions(&self) -> IntentionRepo {
        IntentionRepo {
            client: self.inner.client.clone(),
            store: Arc::clone(&self.inner.store),
            scope: self.inner.config.scope(),
            datacenter: self.datacenter(),
            watch_cfg: self.inner.config.watch_config(self.blocking()),
            watch_scope: self.watch_scope(),
        }
    }

    pub fn sessions(&self) -> SessionRepo {
        SessionRepo {
            client: self.inner.client.clone(),
            store: Arc::clone(&self.inner.store),
            scope: self.inner.config.scope(),
            datacenter: self.datacenter(),
        }
    }

    // ── One-shot convenience ─────────────────────────────────────────

    /// One-shot: connect, run closure, close. Optimized for CLI use.
    pub async fn oneshot<F, Fut, T>(config: ConsoleConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Console) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let console = Console::new(config)?;
        console.connect().await?;
        let result = f(console.clone()).await;
        console.close();
        result
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn watch_scope(&self) -> CancellationToken {
        self.inner
            .watch_scope
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn write_datacenter(&self) -> std::sync::RwLockWriteGuard<'_, String> {
        self.inner
            .datacenter
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
