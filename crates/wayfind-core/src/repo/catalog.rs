// ── Catalog repositories: datacenters, nodes, services ──

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use wayfind_api::query::{QueryOptions, WithMeta};
use wayfind_api::watch::{WatchConfig, WatchHandle, Watcher};
use wayfind_api::HttpClient;

use super::named_not_found;
use crate::error::CoreError;
use crate::model::{Datacenter, HealthCheck, Node, ServiceInstance, ServiceSummary};
use crate::store::DataStore;

// ── Datacenters ──────────────────────────────────────────────────────

/// Datacenter listing. Never supports blocking queries.
pub struct DatacenterRepo {
    pub(crate) client: HttpClient,
    pub(crate) store: Arc<DataStore>,
}

impl DatacenterRepo {
    pub async fn find_all(&self) -> Result<Vec<Datacenter>, CoreError> {
        let names = self.client.list_datacenters().await?;
        self.store.set_datacenters(names.clone());
        Ok(names.into_iter().map(|name| Datacenter { name }).collect())
    }
}

// ── Nodes ────────────────────────────────────────────────────────────

pub struct NodeRepo {
    pub(crate) client: HttpClient,
    pub(crate) store: Arc<DataStore>,
    pub(crate) scope: QueryOptions,
    pub(crate) watch_cfg: WatchConfig,
    pub(crate) watch_scope: CancellationToken,
}

impl NodeRepo {
    /// One-shot listing; replaces the node collection.
    pub async fn find_all(&self) -> Result<Arc<Vec<Arc<Node>>>, CoreError> {
        let page = self.client.ui_nodes(&self.scope).await?;
        let nodes: Vec<Node> = page.body.into_iter().map(Node::from).collect();
        debug!(count = nodes.len(), "refreshed nodes");

        self.store
            .nodes
            .replace_all(nodes.into_iter().map(|n| (n.key.fingerprint(), n)));
        self.store.mark_refreshed();
        Ok(self.store.nodes_snapshot())
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Arc<Node>, CoreError> {
        let page = self
            .client
            .ui_node(name, &self.scope)
            .await
            .map_err(|e| named_not_found(e, "node", name))?;

        let node = Node::from(page.body);
        let fingerprint = node.key.fingerprint();
        self.store.nodes.upsert(fingerprint.clone(), node);
        self.store
            .node(&fingerprint)
            .ok_or_else(|| CoreError::Internal("node vanished after upsert".into()))
    }

    /// Follow the node listing with blocking queries, upserting into the
    /// store on every dispatch.
    pub fn watch_all(&self) -> WatchHandle<Vec<Node>> {
        let client = self.client.clone();
        let store = Arc::clone(&self.store);
        Watcher::spawn_scoped(
            move |opts: QueryOptions| {
                let client = client.clone();
                let store = Arc::clone(&store);
                async move {
                    let page = client.ui_nodes(&opts).await?;
                    let nodes: Vec<Node> = page.body.into_iter().map(Node::from).collect();
                    store
                        .nodes
                        .replace_all(nodes.iter().map(|n| (n.key.fingerprint(), n.clone())));
                    store.mark_refreshed();
                    Ok(WithMeta {
                        body: nodes,
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

// ── Services ─────────────────────────────────────────────────────────

pub struct ServiceRepo {
    pub(crate) client: HttpClient,
    pub(crate) store: Arc<DataStore>,
    pub(crate) scope: QueryOptions,
    pub(crate) watch_cfg: WatchConfig,
    pub(crate) watch_scope: CancellationToken,
}

impl ServiceRepo {
    /// One-shot listing; replaces the service-summary collection.
    pub async fn find_all(&self) -> Result<Arc<Vec<Arc<ServiceSummary>>>, CoreError> {
        let page = self.client.ui_services(&self.scope).await?;
        let services: Vec<ServiceSummary> =
            page.body.into_iter().map(ServiceSummary::from).collect();
        debug!(count = services.len(), "refreshed services");

        self.store
            .services
            .replace_all(services.into_iter().map(|s| (s.key.fingerprint(), s)));
        self.store.mark_refreshed();
        Ok(self.store.services_snapshot())
    }

    /// Instances of one service with node and check detail.
    pub async fn instances(
        &self,
        service: &str,
        passing_only: bool,
    ) -> Result<Vec<ServiceInstance>, CoreError> {
        let page = self
            .client
            .health_service(service, passing_only, &self.scope)
            .await
            .map_err(|e| named_not_found(e, "service", service))?;

        let instances: Vec<ServiceInstance> =
            page.body.into_iter().map(ServiceInstance::from).collect();
        if instances.is_empty() {
            return Err(CoreError::not_found("service", service));
        }

        for instance in &instances {
            self.store
                .instances
                .upsert(instance.key.fingerprint(), instance.clone());
        }
        Ok(instances)
    }

    /// Checks registered for one service across all nodes.
    pub async fn checks(&self, service: &str) -> Result<Vec<HealthCheck>, CoreError> {
        let page = self.client.health_checks(service, &self.scope).await?;
        Ok(page.body.into_iter().map(HealthCheck::from).collect())
    }

    /// Checks registered on one node.
    pub async fn node_checks(&self, node: &str) -> Result<Vec<HealthCheck>, CoreError> {
        let page = self
            .client
            .health_node(node, &self.scope)
            .await
            .map_err(|e| named_not_found(e, "node", node))?;
        Ok(page.body.into_iter().map(HealthCheck::from).collect())
    }

    /// Follow the service listing with blocking queries.
    pub fn watch_all(&self) -> WatchHandle<Vec<ServiceSummary>> {
        let client = self.client.clone();
        let store = Arc::clone(&self.store);
        Watcher::spawn_scoped(
            move |opts: QueryOptions| {
                let client = client.clone();
                let store = Arc::clone(&store);
                async move {
                    let page = client.ui_services(&opts).await?;
                    let services: Vec<ServiceSummary> =
                        page.body.into_iter().map(ServiceSummary::from).collect();
                    store
                        .services
                        .replace_all(services.iter().map(|s| (s.key.fingerprint(), s.clone())));
                    store.mark_refreshed();
                    Ok(WithMeta {
                        body: services,
                        meta: page.meta,
                    })
                }
            },
            self.scope.clone(),
            self.watch_cfg.clone(),
            &self.watch_scope,
        )
    }

    /// Follow one service's instances with blocking queries.
    pub fn watch_instances(&self, service: &str) -> WatchHandle<Vec<ServiceInstance>> {
        let client = self.client.clone();
        let store = Arc::clone(&self.store);
        let service = service.to_owned();
        Watcher::spawn_scoped(
            move |opts: QueryOptions| {
                let client = client.clone();
                let store = Arc::clone(&store);
                let service = service.clone();
                async move {
                    let page = client.health_service(&service, false, &opts).await?;
                    let instances: Vec<ServiceInstance> =
                        page.body.into_iter().map(ServiceInstance::from).collect();
                    for instance in &instances {
                        store
                            .instances
                            .upsert(instance.key.fingerprint(), instance.clone());
                    }
                    Ok(WithMeta {
                        body: instances,
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
