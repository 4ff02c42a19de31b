// ── Query scoping and blocking-query metadata ──
//
// Every read against the control plane carries a QueryOptions (datacenter,
// namespace, partition, cursor) and yields a QueryMeta parsed from the
// response headers. The cursor is the version token blocking queries
// revolve around.

use std::fmt;
use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};

// ── Cursor ──────────────────────────────────────────────────────────

/// Opaque version token returned by the control plane per query.
///
/// Carried in the `X-Consul-Index` response header and echoed back as the
/// `index` request parameter to ask the server to block until the
/// resource's version advances. Not interpretable beyond equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a raw header value. Empty and `"0"` values mean the endpoint
    /// does not version this resource, so they yield `None`.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() || raw == "0" {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── QueryOptions ────────────────────────────────────────────────────

/// Request-side scoping and blocking parameters.
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Target datacenter (`dc` param); server default when absent.
    pub datacenter: Option<String>,
    /// Namespace scope (`ns` param).
    pub namespace: Option<String>,
    /// Admin partition scope (`partition` param).
    pub partition: Option<String>,
    /// Last-seen cursor; presence turns the request into a blocking query.
    pub index: Option<Cursor>,
    /// Server-side hold bound for a blocking query (`wait` param).
    pub wait: Option<Duration>,
    /// Allow stale reads from non-leader servers.
    pub stale: bool,
}

impl QueryOptions {
    /// Scope to a datacenter.
    pub fn datacenter(dc: impl Into<String>) -> Self {
        Self {
            datacenter: Some(dc.into()),
            ..Self::default()
        }
    }

    /// Serialize to query parameters in the form the endpoints expect.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(ref dc) = self.datacenter {
            params.push(("dc", dc.clone()));
        }
        if let Some(ref ns) = self.namespace {
            params.push(("ns", ns.clone()));
        }
        if let Some(ref part) = self.partition {
            params.push(("partition", part.clone()));
        }
        if let Some(ref cursor) = self.index {
            params.push(("index", cursor.as_str().to_owned()));
        }
        if let Some(wait) = self.wait {
            params.push(("wait", format!("{}s", wait.as_secs())));
        }
        if self.stale {
            params.push(("stale", String::new()));
        }
        params
    }
}

// ── QueryMeta ───────────────────────────────────────────────────────

/// Response-side metadata parsed from the control plane's headers.
#[derive(Debug, Clone, Default)]
pub struct QueryMeta {
    /// New cursor for this resource, absent when the endpoint does not
    /// support blocking queries.
    pub index: Option<Cursor>,
    /// Whether the answering server knew a leader.
    pub known_leader: bool,
    /// Time since the answering server's last leader contact.
    pub last_contact: Option<Duration>,
}

impl QueryMeta {
    pub(crate) fn from_headers(headers: &HeaderMap) -> Self {
        let index = headers
            .get("X-Consul-Index")
            .and_then(|v| v.to_str().ok())
            .and_then(Cursor::new);

        let known_leader = headers
            .get("X-Consul-KnownLeader")
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == "true");

        let last_contact = headers
            .get("X-Consul-LastContact")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_millis);

        Self {
            index,
            known_leader,
            last_contact,
        }
    }
}

/// A parsed response body together with its query metadata.
#[derive(Debug, Clone)]
pub struct WithMeta<T> {
    pub body: T,
    pub meta: QueryMeta,
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderMap, HeaderValue};

    #[test]
    fn cursor_rejects_zero_and_empty() {
        assert!(Cursor::new("0").is_none());
        assert!(Cursor::new("").is_none());
        assert!(Cursor::new("5").is_some());
    }

    #[test]
    fn params_include_cursor_and_wait() {
        let opts = QueryOptions {
            datacenter: Some("dc1".into()),
            index: Cursor::new("42"),
            wait: Some(Duration::from_secs(300)),
            ..QueryOptions::default()
        };
        let params = opts.params();
        assert!(params.contains(&("dc", "dc1".into())));
        assert!(params.contains(&("index", "42".into())));
        assert!(params.contains(&("wait", "300s".into())));
    }

    #[test]
    fn params_omit_absent_fields() {
        let params = QueryOptions::default().params();
        assert!(params.is_empty());
    }

    #[test]
    fn meta_parses_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Consul-Index", HeaderValue::from_static("17"));
        headers.insert("X-Consul-KnownLeader", HeaderValue::from_static("true"));
        headers.insert("X-Consul-LastContact", HeaderValue::from_static("12"));

        let meta = QueryMeta::from_headers(&headers);
        assert_eq!(meta.index, Cursor::new("17"));
        assert!(meta.known_leader);
        assert_eq!(meta.last_contact, Some(Duration::from_millis(12)));
    }

    #[test]
    fn meta_without_index_header() {
        let meta = QueryMeta::from_headers(&HeaderMap::new());
        assert!(meta.index.is_none());
        assert!(!meta.known_leader);
    }
}
