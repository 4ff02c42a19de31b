// Key/value store endpoints
//
// Values travel base64-encoded inside the JSON envelope; `decoded_value`
// recovers the raw bytes. PUT/DELETE answer a bare JSON boolean.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;
use crate::http::HttpClient;
use crate::query::{QueryOptions, WithMeta};

// ── Wire types ──────────────────────────────────────────────────────

/// One KV entry as returned by `GET /v1/kv/...`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct KvPair {
    pub key: String,
    /// Base64-encoded value; `None` for a null value.
    pub value: Option<String>,
    pub flags: u64,
    pub create_index: u64,
    pub modify_index: u64,
    pub lock_index: u64,
    pub session: Option<String>,
}

impl KvPair {
    /// Decode the base64 value into raw bytes. Empty for a null value.
    pub fn decoded_value(&self) -> Result<Vec<u8>, Error> {
        match self.value {
            Some(ref encoded) => BASE64.decode(encoded).map_err(|_| Error::InvalidValue {
                key: self.key.clone(),
            }),
            None => Ok(Vec::new()),
        }
    }
}

// ── Endpoints ───────────────────────────────────────────────────────

impl HttpClient {
    /// Read a single key.
    ///
    /// `GET /v1/kv/:key`. The control plane answers with a one-element
    /// array; a missing key is a 404.
    pub async fn kv_get(
        &self,
        key: &str,
        opts: &QueryOptions,
    ) -> Result<WithMeta<Vec<KvPair>>, Error> {
        self.get_with_meta(&format!("v1/kv/{key}"), opts, &[]).await
    }

    /// Recursively read all entries under a prefix.
    ///
    /// `GET /v1/kv/:prefix?recurse`
    pub async fn kv_list(
        &self,
        prefix: &str,
        opts: &QueryOptions,
    ) -> Result<WithMeta<Vec<KvPair>>, Error> {
        self.get_with_meta(
            &format!("v1/kv/{prefix}"),
            opts,
            &[("recurse", String::new())],
        )
        .await
    }

    /// List key names under a prefix, folded at `separator`.
    ///
    /// `GET /v1/kv/:prefix?keys&separator=/`
    pub async fn kv_keys(
        &self,
        prefix: &str,
        separator: Option<&str>,
        opts: &QueryOptions,
    ) -> Result<WithMeta<Vec<String>>, Error> {
        let mut extra = vec![("keys", String::new())];
        if let Some(sep) = separator {
            extra.push(("separator", sep.to_owned()));
        }
        self.get_with_meta(&format!("v1/kv/{prefix}"), opts, &extra)
            .await
    }

    /// Write a key. Returns `false` when a check-and-set write loses.
    ///
    /// `PUT /v1/kv/:key`
    pub async fn kv_put(
        &self,
        key: &str,
        value: Vec<u8>,
        flags: Option<u64>,
        opts: &QueryOptions,
    ) -> Result<bool, Error> {
        let mut params = opts.params();
        if let Some(flags) = flags {
            params.push(("flags", flags.to_string()));
        }
        debug!(key, "writing kv entry");
        self.put_raw(&format!("v1/kv/{key}"), &params, value).await
    }

    /// Delete a key, or a whole prefix with `recurse`.
    ///
    /// `DELETE /v1/kv/:key`
    pub async fn kv_delete(
        &self,
        key: &str,
        recurse: bool,
        opts: &QueryOptions,
    ) -> Result<bool, Error> {
        let mut params = opts.params();
        if recurse {
            params.push(("recurse", String::new()));
        }
        debug!(key, recurse, "deleting kv entry");
        self.delete(&format!("v1/kv/{key}"), &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoded_value_roundtrip() {
        let pair = KvPair {
            key: "config/rate".into(),
            value: Some(BASE64.encode(b"100")),
            ..KvPair::default()
        };
        assert_eq!(pair.decoded_value().unwrap(), b"100");
    }

    #[test]
    fn null_value_decodes_empty() {
        let pair = KvPair {
            key: "marker".into(),
            value: None,
            ..KvPair::default()
        };
        assert!(pair.decoded_value().unwrap().is_empty());
    }

    #[test]
    fn invalid_base64_is_rejected() {
        let pair = KvPair {
            key: "broken".into(),
            value: Some("not base64!!!".into()),
            ..KvPair::default()
        };
        assert!(matches!(
            pair.decoded_value(),
            Err(Error::InvalidValue { .. })
        ));
    }
}
