// ── Intention domain model ──
//
// Intentions are keyed by exact source/destination pair, not by a
// single name; the fingerprint name folds both sides together.

use serde::{Deserialize, Serialize};
use strum::Display;

use super::key::ResourceKey;
use wayfind_api::intentions as wire;

/// One side (source or destination) of an intention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceName {
    pub name: String,
    pub namespace: String,
    pub partition: String,
}

impl ServiceName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: String::new(),
            partition: String::new(),
        }
    }
}

/// What the intention allows.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IntentionAction {
    Allow,
    Deny,
    /// L7 permissions are attached instead of a flat allow/deny.
    AppAware,
}

/// A service-mesh intention between a source and destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intention {
    pub key: ResourceKey,
    pub id: Option<String>,
    pub source: ServiceName,
    pub destination: ServiceName,
    pub action: IntentionAction,
    pub description: String,
    pub precedence: i64,
    pub modify_index: u64,
}

impl Intention {
    pub fn from_wire(w: wire::Intention, datacenter: &str) -> Self {
        let action = if w.permissions.is_some() {
            IntentionAction::AppAware
        } else if w.action == "deny" {
            IntentionAction::Deny
        } else {
            IntentionAction::Allow
        };
        Self {
            key: ResourceKey::new(
                datacenter,
                w.source_partition.clone().unwrap_or_default(),
                w.source_ns.clone().unwrap_or_default(),
                format!("{}->{}", w.source_name, w.destination_name),
            ),
            id: w.id,
            source: ServiceName {
                name: w.source_name,
                namespace: w.source_ns.unwrap_or_default(),
                partition: w.source_partition.unwrap_or_default(),
            },
            destination: ServiceName {
                name: w.destination_name,
                namespace: w.destination_ns.unwrap_or_default(),
                partition: w.destination_partition.unwrap_or_default(),
            },
            action,
            description: w.description,
            precedence: w.precedence,
            modify_index: w.modify_index,
        }
    }

    pub fn to_wire(&self) -> wire::Intention {
        wire::Intention {
            id: self.id.clone(),
            source_name: self.source.name.clone(),
            destination_name: self.destination.name.clone(),
            action: match self.action {
                IntentionAction::Allow => "allow".into(),
                IntentionAction::Deny => "deny".into(),
                // L7 permission editing is not supported here; an
                // app-aware intention round-trips as-is server side.
                IntentionAction::AppAware => String::new(),
            },
            description: self.description.clone(),
            ..wire::Intention::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permissions_imply_app_aware() {
        let w = wire::Intention {
            source_name: "web".into(),
            destination_name: "db".into(),
            action: "allow".into(),
            permissions: Some(serde_json::json!([{ "Action": "allow" }])),
            ..wire::Intention::default()
        };
        let intention = Intention::from_wire(w, "dc1");
        assert_eq!(intention.action, IntentionAction::AppAware);
    }

    #[test]
    fn key_folds_both_sides() {
        let w = wire::Intention {
            source_name: "web".into(),
            destination_name: "db".into(),
            action: "deny".into(),
            ..wire::Intention::default()
        };
        let intention = Intention::from_wire(w, "dc1");
        assert_eq!(intention.key.fingerprint(), "dc1:default:default:web->db");
        assert_eq!(intention.action, IntentionAction::Deny);
    }
}
