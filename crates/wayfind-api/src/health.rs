// Health endpoints
//
// `/v1/health/*` returns node/service/check triples; these are the
// blocking-query workhorses behind service detail views.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::http::HttpClient;
use crate::query::{QueryOptions, WithMeta};

// ── Wire types ──────────────────────────────────────────────────────

/// A single health check registration with its current status.
///
/// Status is kept as the raw wire string here; `wayfind-core` maps it to
/// a typed enum.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct HealthCheck {
    pub node: String,
    #[serde(rename = "CheckID")]
    pub check_id: String,
    pub name: String,
    pub status: String,
    pub notes: String,
    pub output: String,
    #[serde(rename = "ServiceID")]
    pub service_id: String,
    pub service_name: String,
    #[serde(rename = "Type")]
    pub kind: String,
}

/// Node half of a health-service entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NodeStub {
    #[serde(rename = "ID")]
    pub id: String,
    pub node: String,
    pub address: String,
    pub datacenter: String,
    pub meta: Option<HashMap<String, String>>,
}

/// Service half of a health-service entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AgentService {
    #[serde(rename = "ID")]
    pub id: String,
    pub service: String,
    pub tags: Option<Vec<String>>,
    pub address: String,
    pub port: u16,
    pub meta: Option<HashMap<String, String>>,
    pub namespace: String,
    pub partition: String,
}

/// One service instance: its node, registration, and checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ServiceEntry {
    pub node: NodeStub,
    pub service: AgentService,
    pub checks: Vec<HealthCheck>,
}

// ── Endpoints ───────────────────────────────────────────────────────

impl HttpClient {
    /// List all instances of a service with node and check detail.
    ///
    /// `GET /v1/health/service/:name`
    pub async fn health_service(
        &self,
        service: &str,
        passing_only: bool,
        opts: &QueryOptions,
    ) -> Result<WithMeta<Vec<ServiceEntry>>, Error> {
        let extra: &[(&str, String)] = if passing_only {
            &[("passing", String::new())]
        } else {
            &[]
        };
        self.get_with_meta(&format!("v1/health/service/{service}"), opts, extra)
            .await
    }

    /// List the checks registered on one node.
    ///
    /// `GET /v1/health/node/:name`
    pub async fn health_node(
        &self,
        node: &str,
        opts: &QueryOptions,
    ) -> Result<WithMeta<Vec<HealthCheck>>, Error> {
        self.get_with_meta(&format!("v1/health/node/{node}"), opts, &[])
            .await
    }

    /// List the checks associated with one service across all nodes.
    ///
    /// `GET /v1/health/checks/:service`
    pub async fn health_checks(
        &self,
        service: &str,
        opts: &QueryOptions,
    ) -> Result<WithMeta<Vec<HealthCheck>>, Error> {
        self.get_with_meta(&format!("v1/health/checks/{service}"), opts, &[])
            .await
    }
}
