// ── KV repository ──

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use wayfind_api::query::{QueryOptions, WithMeta};
use wayfind_api::watch::{WatchConfig, WatchHandle, Watcher};
use wayfind_api::HttpClient;

use super::named_not_found;
use crate::error::CoreError;
use crate::model::{KvEntry, ResourceKey};
use crate::store::DataStore;

pub struct KvRepo {
    pub(crate) client: HttpClient,
    pub(crate) store: Arc<DataStore>,
    pub(crate) scope: QueryOptions,
    pub(crate) datacenter: String,
    pub(crate) watch_cfg: WatchConfig,
    pub(crate) watch_scope: CancellationToken,
}

impl KvRepo {
    /// Read one key.
    pub async fn get(&self, path: &str) -> Result<KvEntry, CoreError> {
        let page = self
            .client
            .kv_get(path, &self.scope)
            .await
            .map_err(|e| named_not_found(e, "key", path))?;

        let pair = page
            .body
            .into_iter()
            .next()
            .ok_or_else(|| CoreError::not_found("key", path))?;

        // The answer must be for the key we asked about.
        if pair.key != path {
            return Err(CoreError::ReconciliationFailed {
                expected: path.into(),
                got: pair.key,
            });
        }

        let entry = KvEntry::from_wire(pair, &self.datacenter)?;
        self.store.kv.upsert(entry.key.fingerprint(), entry.clone());
        Ok(entry)
    }

    /// Recursively read everything under a prefix.
    pub async fn list(&self, prefix: &str) -> Result<Vec<KvEntry>, CoreError> {
        let page = self
            .client
            .kv_list(prefix, &self.scope)
            .await
            .map_err(|e| named_not_found(e, "prefix", prefix))?;

        let entries = page
            .body
            .into_iter()
            .map(|pair| KvEntry::from_wire(pair, &self.datacenter))
            .collect::<Result<Vec<_>, _>>()?;

        for entry in &entries {
            self.store.kv.upsert(entry.key.fingerprint(), entry.clone());
        }
        Ok(entries)
    }

    /// List key names under a prefix, folded at the separator.
    pub async fn keys(&self, prefix: &str, separator: Option<&str>) -> Result<Vec<String>, CoreError> {
        let page = self
            .client
            .kv_keys(prefix, separator, &self.scope)
            .await
            .map_err(|e| named_not_found(e, "prefix", prefix))?;
        Ok(page.body)
    }

    /// Write a key. Returns `false` when the write loses a
    /// check-and-set race.
    pub async fn put(
        &self,
        path: &str,
        value: Vec<u8>,
        flags: Option<u64>,
    ) -> Result<bool, CoreError> {
        let applied = self.client.kv_put(path, value, flags, &self.scope).await?;
        debug!(path, applied, "kv write");

        // Invalidate so the next read refetches the server's version.
        let fingerprint = ResourceKey::named(&self.datacenter, path).fingerprint();
        self.store.kv.remove(&fingerprint);
        Ok(applied)
    }

    /// Delete a key, or a whole prefix with `recurse`.
    pub async fn delete(&self, path: &str, recurse: bool) -> Result<bool, CoreError> {
        let deleted = self.client.kv_delete(path, recurse, &self.scope).await?;

        let fingerprint = ResourceKey::named(&self.datacenter, path).fingerprint();
        self.store.kv.remove(&fingerprint);
        Ok(deleted)
    }

    /// Follow a prefix with blocking queries.
    pub fn watch(&self, prefix: &str) -> WatchHandle<Vec<KvEntry>> {
        let client = self.client.clone();
        let store = Arc::clone(&self.store);
        let datacenter = self.datacenter.clone();
        let prefix = prefix.to_owned();
        Watcher::spawn_scoped(
            move |opts: QueryOptions| {
                let client = client.clone();
                let store = Arc::clone(&store);
                let datacenter = datacenter.clone();
                let prefix = prefix.clone();
                async move {
                    let page = client.kv_list(&prefix, &opts).await?;
                    let mut entries = Vec::with_capacity(page.body.len());
                    for pair in page.body {
                        match KvEntry::from_wire(pair, &datacenter) {
                            Ok(entry) => {
                                store.kv.upsert(entry.key.fingerprint(), entry.clone());
                                entries.push(entry);
                            }
                            // A single undecodable value must not kill
                            // the subscription.
                            Err(err) => debug!(error = %err, "skipping undecodable kv value"),
                        }
                    }
                    Ok(WithMeta {
                        body: entries,
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
