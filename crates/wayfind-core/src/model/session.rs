// ── Session domain model ──

use serde::{Deserialize, Serialize};
use strum::Display;

use super::key::ResourceKey;
use wayfind_api::sessions as wire;

/// What happens to held locks when a session is invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SessionBehavior {
    /// Locks are released (default).
    Release,
    /// Locked KV entries are deleted.
    Delete,
}

/// A session backing KV locks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub key: ResourceKey,
    pub id: String,
    pub name: String,
    pub node: String,
    pub behavior: SessionBehavior,
    /// Raw TTL string as registered, e.g. `15s`; empty when none.
    pub ttl: String,
    pub lock_delay_nanos: u64,
    pub checks: Vec<String>,
}

impl Session {
    pub fn from_wire(w: wire::Session, datacenter: &str) -> Self {
        Self {
            key: ResourceKey::named(datacenter, w.id.clone()),
            id: w.id,
            name: w.name,
            node: w.node,
            behavior: if w.behavior == "delete" {
                SessionBehavior::Delete
            } else {
                SessionBehavior::Release
            },
            ttl: w.ttl,
            lock_delay_nanos: w.lock_delay,
            checks: w.checks.unwrap_or_default(),
        }
    }
}
