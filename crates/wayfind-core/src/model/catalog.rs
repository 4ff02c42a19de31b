// ── Catalog domain models ──
//
// Nodes, service summaries, service instances, and health checks with
// worst-of status aggregation. Conversions from the wire shapes carry
// the scope segments into composite keys.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::Display;

use super::key::ResourceKey;
use wayfind_api::catalog as wire;
use wayfind_api::health as wire_health;

// ── Check status ─────────────────────────────────────────────────────

/// Health check status, ordered from healthy to unhealthy so that
/// `max()` yields the worst.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Passing,
    Warning,
    Critical,
}

impl CheckStatus {
    /// Parse the wire status string. Anything unrecognized (including
    /// `maintenance`) counts as critical.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "passing" => Self::Passing,
            "warning" => Self::Warning,
            _ => Self::Critical,
        }
    }

    /// Worst-of aggregation over a set of checks. No checks means
    /// passing (a node with nothing to report is healthy).
    pub fn aggregate<'a>(checks: impl IntoIterator<Item = &'a HealthCheck>) -> Self {
        checks
            .into_iter()
            .map(|c| c.status)
            .max()
            .unwrap_or(Self::Passing)
    }
}

// ── Health checks ────────────────────────────────────────────────────

/// One registered health check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    pub id: String,
    pub name: String,
    pub status: CheckStatus,
    pub node: String,
    pub service_id: Option<String>,
    pub service_name: Option<String>,
    pub kind: Option<String>,
    pub notes: String,
    pub output: String,
}

impl From<wire_health::HealthCheck> for HealthCheck {
    fn from(w: wire_health::HealthCheck) -> Self {
        Self {
            id: w.check_id,
            name: w.name,
            status: CheckStatus::parse(&w.status),
            node: w.node,
            // Node-level checks carry empty service fields on the wire.
            service_id: non_empty(w.service_id),
            service_name: non_empty(w.service_name),
            kind: non_empty(w.kind),
            notes: w.notes,
            output: w.output,
        }
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}

// ── Datacenters ──────────────────────────────────────────────────────

/// A known datacenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datacenter {
    pub name: String,
}

// ── Nodes ────────────────────────────────────────────────────────────

/// Service registration stub embedded in a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRef {
    pub id: String,
    pub name: String,
    pub port: u16,
    pub tags: Vec<String>,
}

/// A catalog node with its services and checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub key: ResourceKey,
    pub id: String,
    pub address: String,
    pub tagged_addresses: HashMap<String, String>,
    pub meta: HashMap<String, String>,
    pub services: Vec<ServiceRef>,
    pub checks: Vec<HealthCheck>,
}

impl Node {
    /// Worst-of status over the node's checks.
    pub fn status(&self) -> CheckStatus {
        CheckStatus::aggregate(&self.checks)
    }
}

impl From<wire::UiNode> for Node {
    fn from(w: wire::UiNode) -> Self {
        Self {
            key: ResourceKey::new(w.datacenter, w.partition, "", w.node),
            id: w.id,
            address: w.address,
            tagged_addresses: w.tagged_addresses.unwrap_or_default(),
            meta: w.meta.unwrap_or_default(),
            services: w
                .services
                .into_iter()
                .map(|s| ServiceRef {
                    id: s.id,
                    name: s.service,
                    port: s.port,
                    tags: s.tags.unwrap_or_default(),
                })
                .collect(),
            checks: w.checks.into_iter().map(HealthCheck::from).collect(),
        }
    }
}

// ── Services ─────────────────────────────────────────────────────────

/// Per-service aggregate from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSummary {
    pub key: ResourceKey,
    pub kind: String,
    pub tags: Vec<String>,
    pub nodes: Vec<String>,
    pub instance_count: u32,
    pub checks_passing: u32,
    pub checks_warning: u32,
    pub checks_critical: u32,
}

impl ServiceSummary {
    /// Worst-of status derived from the aggregate check counts.
    pub fn status(&self) -> CheckStatus {
        if self.checks_critical > 0 {
            CheckStatus::Critical
        } else if self.checks_warning > 0 {
            CheckStatus::Warning
        } else {
            CheckStatus::Passing
        }
    }
}

impl From<wire::ServiceSummary> for ServiceSummary {
    fn from(w: wire::ServiceSummary) -> Self {
        Self {
            key: ResourceKey::new(w.datacenter, w.partition, w.namespace, w.name),
            kind: w.kind,
            tags: w.tags.unwrap_or_default(),
            nodes: w.nodes,
            instance_count: w.instance_count,
            checks_passing: w.checks_passing,
            checks_warning: w.checks_warning,
            checks_critical: w.checks_critical,
        }
    }
}

/// One instance of a service on a node, with its checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInstance {
    pub key: ResourceKey,
    pub node: String,
    pub node_address: String,
    pub service_id: String,
    pub service_name: String,
    pub address: String,
    pub port: u16,
    pub tags: Vec<String>,
    pub checks: Vec<HealthCheck>,
}

impl ServiceInstance {
    pub fn status(&self) -> CheckStatus {
        CheckStatus::aggregate(&self.checks)
    }
}

impl From<wire_health::ServiceEntry> for ServiceInstance {
    fn from(w: wire_health::ServiceEntry) -> Self {
        let address = if w.service.address.is_empty() {
            w.node.address.clone()
        } else {
            w.service.address.clone()
        };
        Self {
            key: ResourceKey::new(
                w.node.datacenter,
                w.service.partition,
                w.service.namespace,
                // Instance identity is service id scoped to its node.
                format!("{}@{}", w.service.id, w.node.node),
            ),
            node: w.node.node,
            node_address: w.node.address,
            service_id: w.service.id,
            service_name: w.service.service,
            address,
            port: w.service.port,
            tags: w.service.tags.unwrap_or_default(),
            checks: w.checks.into_iter().map(HealthCheck::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(status: CheckStatus) -> HealthCheck {
        HealthCheck {
            id: "c".into(),
            name: "c".into(),
            status,
            node: "n".into(),
            service_id: None,
            service_name: None,
            kind: None,
            notes: String::new(),
            output: String::new(),
        }
    }

    #[test]
    fn aggregate_is_worst_of() {
        let checks = vec![
            check(CheckStatus::Passing),
            check(CheckStatus::Warning),
            check(CheckStatus::Passing),
        ];
        assert_eq!(CheckStatus::aggregate(&checks), CheckStatus::Warning);

        let checks = vec![check(CheckStatus::Warning), check(CheckStatus::Critical)];
        assert_eq!(CheckStatus::aggregate(&checks), CheckStatus::Critical);
    }

    #[test]
    fn aggregate_of_nothing_is_passing() {
        assert_eq!(CheckStatus::aggregate(&[]), CheckStatus::Passing);
    }

    #[test]
    fn unknown_status_counts_as_critical() {
        assert_eq!(CheckStatus::parse("maintenance"), CheckStatus::Critical);
        assert_eq!(CheckStatus::parse(""), CheckStatus::Critical);
    }

    #[test]
    fn summary_status_from_counts() {
        let summary = ServiceSummary {
            key: ResourceKey::named("dc1", "web"),
            kind: String::new(),
            tags: Vec::new(),
            nodes: Vec::new(),
            instance_count: 3,
            checks_passing: 2,
            checks_warning: 1,
            checks_critical: 0,
        };
        assert_eq!(summary.status(), CheckStatus::Warning);
    }
}
