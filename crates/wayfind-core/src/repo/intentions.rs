// ── Intention repository ──

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use wayfind_api::query::{QueryOptions, WithMeta};
use wayfind_api::watch::{WatchConfig, WatchHandle, Watcher};
use wayfind_api::HttpClient;

use super::named_not_found;
use crate::error::CoreError;
use crate::model::Intention;
use crate::store::DataStore;

pub struct IntentionRepo {
    pub(crate) client: HttpClient,
    pub(crate) store: Arc<DataStore>,
    pub(crate) scope: QueryOptions,
    pub(crate) datacenter: String,
    pub(crate) watch_cfg: WatchConfig,
    pub(crate) watch_scope: CancellationToken,
}

impl IntentionRepo {
    /// List all intentions, ordered by precedence server-side.
    pub async fn find_all(&self) -> Result<Arc<Vec<Arc<Intention>>>, CoreError> {
        let page = self.client.intentions(&self.scope).await?;
        let intentions: Vec<Intention> = page
            .body
            .into_iter()
            .map(|w| Intention::from_wire(w, &self.datacenter))
            .collect();
        debug!(count = intentions.len(), "refreshed intentions");

        self.store
            .intentions
            .replace_all(intentions.into_iter().map(|i| (i.key.fingerprint(), i)));
        Ok(self.store.intentions_snapshot())
    }

    /// Read one intention by exact source/destination pair.
    pub async fn find(&self, source: &str, destination: &str) -> Result<Intention, CoreError> {
        let pair = format!("{source}->{destination}");
        let page = self
            .client
            .intention_exact(source, destination, &self.scope)
            .await
            .map_err(|e| named_not_found(e, "intention", &pair))?;

        let intention = Intention::from_wire(page.body, &self.datacenter);

        // The exact endpoint must answer for the pair we asked about.
        if intention.source.name != source || intention.destination.name != destination {
            return Err(CoreError::ReconciliationFailed {
                expected: pair,
                got: format!(
                    "{}->{}",
                    intention.source.name, intention.destination.name
                ),
            });
        }

        self.store
            .intentions
            .upsert(intention.key.fingerprint(), intention.clone());
        Ok(intention)
    }

    /// Create or update an intention by exact name pair.
    pub async fn persist(&self, intention: &Intention) -> Result<(), CoreError> {
        self.client
            .intention_upsert(
                &intention.source.name,
                &intention.destination.name,
                &intention.to_wire(),
                &self.scope,
            )
            .await?;
        // Invalidate so the next read picks up server-side precedence.
        self.store.intentions.remove(&intention.key.fingerprint());
        Ok(())
    }

    pub async fn remove(&self, source: &str, destination: &str) -> Result<(), CoreError> {
        let pair = format!("{source}->{destination}");
        self.client
            .intention_delete(source, destination, &self.scope)
            .await
            .map_err(|e| named_not_found(e, "intention", &pair))?;

        // Drop every store entry matching the pair regardless of scope
        // segments; the fingerprint embeds ns/partition we may not know.
        let stale: Vec<String> = self
            .store
            .intentions_snapshot()
            .iter()
            .filter(|i| i.source.name == source && i.destination.name == destination)
            .map(|i| i.key.fingerprint())
            .collect();
        for fingerprint in stale {
            self.store.intentions.remove(&fingerprint);
        }
        Ok(())
    }

    /// Follow the intention listing with blocking queries.
    pub fn watch_all(&self) -> WatchHandle<Vec<Intention>> {
        let client = self.client.clone();
        let store = Arc::clone(&self.store);
        let datacenter = self.datacenter.clone();
        Watcher::spawn_scoped(
            move |opts: QueryOptions| {
                let client = client.clone();
                let store = Arc::clone(&store);
                let datacenter = datacenter.clone();
                async move {
                    let page = client.intentions(&opts).await?;
                    let intentions: Vec<Intention> = page
                        .body
                        .into_iter()
                        .map(|w| Intention::from_wire(w, &datacenter))
                        .collect();
                    store
                        .intentions
                        .replace_all(intentions.iter().map(|i| (i.key.fingerprint(), i.clone())));
                    Ok(WithMeta {
                        body: intentions,
                        meta: page.meta,
                    })
                }
            },
            self.scope.clone(),
            self.watch_cfg.clone(),
            &self.watch_scope,
        )
    }
}
