// ── Central reactive data store ──
//
// Thread-safe, lock-free storage for all control-plane resources.
// Mutations are broadcast to subscribers via `watch` channels. One
// typed collection per resource; no dynamic string-keyed lookup.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::collection::ResourceCollection;
use crate::model::{
    Intention, KvEntry, Node, Policy, Role, ServiceInstance, ServiceSummary, Session, Token,
};
use crate::stream::ResourceStream;

/// Central reactive store for all control-plane resources.
///
/// Thread-safe and lock-free: reads are wait-free, writes use
/// fine-grained per-shard locks within `DashMap`. Repositories write
/// into it; consumers subscribe through typed accessors.
pub struct DataStore {
    pub(crate) datacenters: watch::Sender<Arc<Vec<String>>>,
    pub(crate) nodes: ResourceCollection<Node>,
    pub(crate) services: ResourceCollection<ServiceSummary>,
    pub(crate) instances: ResourceCollection<ServiceInstance>,
    pub(crate) kv: ResourceCollection<KvEntry>,
    pub(crate) tokens: ResourceCollection<Token>,
    pub(crate) policies: ResourceCollection<Policy>,
    pub(crate) roles: ResourceCollection<Role>,
    pub(crate) intentions: ResourceCollection<Intention>,
    pub(crate) sessions: ResourceCollection<Session>,
    pub(crate) last_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DataStore {
    pub fn new() -> Self {
        let (datacenters, _) = watch::channel(Arc::new(Vec::new()));
        let (last_refresh, _) = watch::channel(None);

        Self {
            datacenters,
            nodes: ResourceCollection::new(),
            services: ResourceCollection::new(),
            instances: ResourceCollection::new(),
            kv: ResourceCollection::new(),
            tokens: ResourceCollection::new(),
            policies: ResourceCollection::new(),
            roles: ResourceCollection::new(),
            intentions: ResourceCollection::new(),
            sessions: ResourceCollection::new(),
            last_refresh,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn datacenters_snapshot(&self) -> Arc<Vec<String>> {
        self.datacenters.borrow().clone()
    }

    pub fn nodes_snapshot(&self) -> Arc<Vec<Arc<Node>>> {
        self.nodes.snapshot()
    }

    pub fn services_snapshot(&self) -> Arc<Vec<Arc<ServiceSummary>>> {
        self.services.snapshot()
    }

    pub fn instances_snapshot(&self) -> Arc<Vec<Arc<ServiceInstance>>> {
        self.instances.snapshot()
    }

    pub fn kv_snapshot(&self) -> Arc<Vec<Arc<KvEntry>>> {
        self.kv.snapshot()
    }

    pub fn tokens_snapshot(&self) -> Arc<Vec<Arc<Token>>> {
        self.tokens.snapshot()
    }

    pub fn policies_snapshot(&self) -> Arc<Vec<Arc<Policy>>> {
        self.policies.snapshot()
    }

    pub fn roles_snapshot(&self) -> Arc<Vec<Arc<Role>>> {
        self.roles.snapshot()
    }

    pub fn intentions_snapshot(&self) -> Arc<Vec<Arc<Intention>>> {
        self.intentions.snapshot()
    }

    pub fn sessions_snapshot(&self) -> Arc<Vec<Arc<Session>>> {
        self.sessions.snapshot()
    }

    // ── Single-resource lookups (by fingerprint) ─────────────────────

    pub fn node(&self, fingerprint: &str) -> Option<Arc<Node>> {
        self.nodes.get(fingerprint)
    }

    pub fn service(&self, fingerprint: &str) -> Option<Arc<ServiceSummary>> {
        self.services.get(fingerprint)
    }

    pub fn kv_entry(&self, fingerprint: &str) -> Option<Arc<KvEntry>> {
        self.kv.get(fingerprint)
    }

    pub fn token(&self, fingerprint: &str) -> Option<Arc<Token>> {
        self.tokens.get(fingerprint)
    }

    // ── Count accessors ──────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_nodes(&self) -> ResourceStream<Node> {
        ResourceStream::new(self.nodes.subscribe())
    }

    pub fn subscribe_services(&self) -> ResourceStream<ServiceSummary> {
        ResourceStream::new(self.services.subscribe())
    }

    pub fn subscribe_instances(&self) -> ResourceStream<ServiceInstance> {
        ResourceStream::new(self.instances.subscribe())
    }

    pub fn subscribe_kv(&self) -> ResourceStream<KvEntry> {
        ResourceStream::new(self.kv.subscribe())
    }

    pub fn subscribe_tokens(&self) -> ResourceStream<Token> {
        ResourceStream::new(self.tokens.subscribe())
    }

    pub fn subscribe_intentions(&self) -> ResourceStream<Intention> {
        ResourceStream::new(self.intentions.subscribe())
    }

    pub fn subscribe_sessions(&self) -> ResourceStream<Session> {
        ResourceStream::new(self.sessions.subscribe())
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub(crate) fn set_datacenters(&self, dcs: Vec<String>) {
        self.datacenters.send_modify(|d| *d = Arc::new(dcs));
    }

    pub(crate) fn mark_refreshed(&self) {
        let _ = self.last_refresh.send(Some(Utc::now()));
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    /// How long ago the last refresh occurred, or `None` if never.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_refresh().map(|t| Utc::now() - t)
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}
