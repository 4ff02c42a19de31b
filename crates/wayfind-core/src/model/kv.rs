// ── KV domain model ──

use serde::{Deserialize, Serialize};

use super::key::ResourceKey;
use crate::error::CoreError;
use wayfind_api::kv as wire;

/// One key/value entry with its value decoded to raw bytes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvEntry {
    pub key: ResourceKey,
    /// Full key path within the store, e.g. `config/service/rate`.
    pub path: String,
    pub value: Vec<u8>,
    pub flags: u64,
    pub create_index: u64,
    pub modify_index: u64,
    pub lock_index: u64,
    /// Session holding the lock on this entry, if any.
    pub session: Option<String>,
}

impl KvEntry {
    /// Convert a wire pair, decoding the base64 value. The datacenter
    /// comes from the request scope since KV responses do not carry it.
    pub fn from_wire(pair: wire::KvPair, datacenter: &str) -> Result<Self, CoreError> {
        let value = pair.decoded_value()?;
        Ok(Self {
            key: ResourceKey::named(datacenter, pair.key.clone()),
            path: pair.key,
            value,
            flags: pair.flags,
            create_index: pair.create_index,
            modify_index: pair.modify_index,
            lock_index: pair.lock_index,
            session: pair.session,
        })
    }

    /// The value as UTF-8, when it is valid UTF-8.
    pub fn value_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.value).ok()
    }

    /// Whether this entry is a folder marker (trailing separator).
    pub fn is_folder(&self) -> bool {
        self.path.ends_with('/')
    }

    /// Last path segment, for tree-style listings.
    pub fn basename(&self) -> &str {
        self.path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(path: &str, value: &[u8]) -> KvEntry {
        KvEntry {
            key: ResourceKey::named("dc1", path),
            path: path.into(),
            value: value.to_vec(),
            flags: 0,
            create_index: 1,
            modify_index: 1,
            lock_index: 0,
            session: None,
        }
    }

    #[test]
    fn folder_detection() {
        assert!(entry("config/", b"").is_folder());
        assert!(!entry("config/rate", b"100").is_folder());
    }

    #[test]
    fn basename_strips_prefix() {
        assert_eq!(entry("config/service/rate", b"").basename(), "rate");
        assert_eq!(entry("config/service/", b"").basename(), "service");
        assert_eq!(entry("toplevel", b"").basename(), "toplevel");
    }

    #[test]
    fn value_str_requires_utf8() {
        assert_eq!(entry("a", b"hello").value_str(), Some("hello"));
        assert_eq!(entry("b", &[0xff, 0xfe]).value_str(), None);
    }
}
