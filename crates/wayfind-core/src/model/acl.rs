// ── ACL domain models ──
//
// Tokens, policies, and roles. Wire-to-domain conversion resolves the
// scope into composite keys; the reverse conversion builds write bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::key::ResourceKey;
use wayfind_api::acl as wire;

/// Reference to a policy or role attached to a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRef {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl From<wire::AclLink> for LinkRef {
    fn from(w: wire::AclLink) -> Self {
        Self {
            id: w.id,
            name: w.name,
        }
    }
}

impl From<LinkRef> for wire::AclLink {
    fn from(l: LinkRef) -> Self {
        Self {
            id: l.id,
            name: l.name,
        }
    }
}

// ── Tokens ───────────────────────────────────────────────────────────

/// An ACL token. The secret is only present after a read or create.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub key: ResourceKey,
    pub accessor: Uuid,
    pub secret: Option<Uuid>,
    pub description: String,
    pub policies: Vec<LinkRef>,
    pub roles: Vec<LinkRef>,
    pub local: bool,
    pub created: Option<DateTime<Utc>>,
    pub modify_index: u64,
}

impl Token {
    /// Convert a wire token, or `None` for a malformed stub without an
    /// accessor ID.
    pub fn from_wire(w: wire::AclToken, datacenter: &str) -> Option<Self> {
        let accessor = w.accessor_id?;
        Some(Self {
            key: ResourceKey::new(
                datacenter,
                w.partition.unwrap_or_default(),
                w.namespace.unwrap_or_default(),
                accessor.to_string(),
            ),
            accessor,
            secret: w.secret_id,
            description: w.description,
            policies: w.policies.unwrap_or_default().into_iter().map(LinkRef::from).collect(),
            roles: w.roles.unwrap_or_default().into_iter().map(LinkRef::from).collect(),
            local: w.local,
            created: w.create_time,
            modify_index: w.modify_index,
        })
    }

    /// Build the wire body for a create or update. A nil accessor is
    /// omitted so the server generates one.
    pub fn to_wire(&self) -> wire::AclToken {
        wire::AclToken {
            accessor_id: (!self.accessor.is_nil()).then_some(self.accessor),
            secret_id: None,
            description: self.description.clone(),
            policies: Some(self.policies.iter().cloned().map(Into::into).collect()),
            roles: Some(self.roles.iter().cloned().map(Into::into).collect()),
            local: self.local,
            ..wire::AclToken::default()
        }
    }
}

// ── Policies ─────────────────────────────────────────────────────────

/// An ACL policy with its rule document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Policy {
    pub key: ResourceKey,
    pub id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub rules: String,
    pub datacenters: Vec<String>,
    pub modify_index: u64,
}

impl Policy {
    pub fn from_wire(w: wire::AclPolicy, datacenter: &str) -> Self {
        Self {
            key: ResourceKey::new(
                datacenter,
                w.partition.unwrap_or_default(),
                w.namespace.unwrap_or_default(),
                w.name.clone(),
            ),
            id: w.id,
            name: w.name,
            description: w.description,
            rules: w.rules,
            datacenters: w.datacenters.unwrap_or_default(),
            modify_index: w.modify_index,
        }
    }

    pub fn to_wire(&self) -> wire::AclPolicy {
        wire::AclPolicy {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            rules: self.rules.clone(),
            datacenters: if self.datacenters.is_empty() {
                None
            } else {
                Some(self.datacenters.clone())
            },
            ..wire::AclPolicy::default()
        }
    }
}

// ── Roles ────────────────────────────────────────────────────────────

/// An ACL role bundling policies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub key: ResourceKey,
    pub id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub policies: Vec<LinkRef>,
    pub modify_index: u64,
}

impl Role {
    pub fn from_wire(w: wire::AclRole, datacenter: &str) -> Self {
        Self {
            key: ResourceKey::new(
                datacenter,
                w.partition.unwrap_or_default(),
                w.namespace.unwrap_or_default(),
                w.name.clone(),
            ),
            id: w.id,
            name: w.name,
            description: w.description,
            policies: w.policies.unwrap_or_default().into_iter().map(LinkRef::from).collect(),
            modify_index: w.modify_index,
        }
    }

    pub fn to_wire(&self) -> wire::AclRole {
        wire::AclRole {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            policies: Some(self.policies.iter().cloned().map(Into::into).collect()),
            ..wire::AclRole::default()
        }
    }
}
