// ── Composite resource keys ──
//
// A resource is identified by datacenter, partition, namespace, and
// name together; the fingerprint string keys the store so entries stay
// stable across refetches and list diffing holds.

use std::fmt;

use serde::{Deserialize, Serialize};

const DEFAULT_SEGMENT: &str = "default";

/// Composite identity of one control-plane resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKey {
    pub datacenter: String,
    /// Admin partition; empty means `default`.
    pub partition: String,
    /// Namespace; empty means `default`.
    pub namespace: String,
    pub name: String,
}

impl ResourceKey {
    pub fn new(
        datacenter: impl Into<String>,
        partition: impl Into<String>,
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            datacenter: datacenter.into(),
            partition: partition.into(),
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key with default partition and namespace.
    pub fn named(datacenter: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(datacenter, "", "", name)
    }

    /// Render `dc:partition:ns:name` with empty segments normalized to
    /// `default`. Stable across refetches.
    pub fn fingerprint(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            self.datacenter,
            normalize(&self.partition),
            normalize(&self.namespace),
            self.name
        )
    }
}

fn normalize(segment: &str) -> &str {
    if segment.is_empty() {
        DEFAULT_SEGMENT
    } else {
        segment
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fingerprint())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_normalizes_empty_segments() {
        let key = ResourceKey::named("dc1", "web");
        assert_eq!(key.fingerprint(), "dc1:default:default:web");
    }

    #[test]
    fn fingerprint_keeps_explicit_segments() {
        let key = ResourceKey::new("dc1", "team-a", "payments", "web");
        assert_eq!(key.fingerprint(), "dc1:team-a:payments:web");
    }

    #[test]
    fn fingerprint_is_stable() {
        let a = ResourceKey::named("dc1", "web");
        let b = ResourceKey::new("dc1", "", "", "web");
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a, b);
    }
}
