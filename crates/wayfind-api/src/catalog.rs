// Catalog and internal-UI endpoints
//
// The `/v1/internal/ui/*` endpoints return pre-aggregated node/service
// views (the shapes the admin surfaces render); plain catalog endpoints
// cover datacenters.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;
use crate::health::HealthCheck;
use crate::http::HttpClient;
use crate::query::{QueryOptions, WithMeta};

// ── Wire types ──────────────────────────────────────────────────────

/// A service registration stub as embedded in a node view.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NodeServiceStub {
    #[serde(rename = "ID")]
    pub id: String,
    pub service: String,
    pub tags: Option<Vec<String>>,
    pub port: u16,
}

/// A node with its services and checks, as returned by the UI endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UiNode {
    #[serde(rename = "ID")]
    pub id: String,
    pub node: String,
    pub address: String,
    pub datacenter: String,
    pub partition: String,
    pub tagged_addresses: Option<HashMap<String, String>>,
    pub meta: Option<HashMap<String, String>>,
    pub services: Vec<NodeServiceStub>,
    pub checks: Vec<HealthCheck>,
}

/// Per-service aggregate (instance and check counts) from the UI
/// services endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceSummary {
    pub name: String,
    pub datacenter: String,
    pub kind: String,
    pub tags: Option<Vec<String>>,
    pub nodes: Vec<String>,
    pub instance_count: u32,
    pub checks_passing: u32,
    pub checks_warning: u32,
    pub checks_critical: u32,
    pub partition: String,
    pub namespace: String,
}

// ── Endpoints ───────────────────────────────────────────────────────

impl HttpClient {
    /// List all known datacenters.
    ///
    /// `GET /v1/catalog/datacenters`. Never supports blocking queries,
    /// so this is a plain one-shot.
    pub async fn list_datacenters(&self) -> Result<Vec<String>, Error> {
        debug!("listing datacenters");
        self.get("v1/catalog/datacenters", &[]).await
    }

    /// List nodes with aggregated health.
    ///
    /// `GET /v1/internal/ui/nodes`
    pub async fn ui_nodes(&self, opts: &QueryOptions) -> Result<WithMeta<Vec<UiNode>>, Error> {
        self.get_with_meta("v1/internal/ui/nodes", opts, &[]).await
    }

    /// Fetch one node by name, with its services and checks.
    ///
    /// `GET /v1/internal/ui/node/:name`
    pub async fn ui_node(
        &self,
        name: &str,
        opts: &QueryOptions,
    ) -> Result<WithMeta<UiNode>, Error> {
        self.get_with_meta(&format!("v1/internal/ui/node/{name}"), opts, &[])
            .await
    }

    /// List services with instance/check aggregates.
    ///
    /// `GET /v1/internal/ui/services`
    pub async fn ui_services(
        &self,
        opts: &QueryOptions,
    ) -> Result<WithMeta<Vec<ServiceSummary>>, Error> {
        self.get_with_meta("v1/internal/ui/services", opts, &[])
            .await
    }
}
