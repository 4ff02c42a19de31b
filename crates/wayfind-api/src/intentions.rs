// Service-mesh intention endpoints
//
// Intentions are addressed by exact source/destination name pairs; the
// exact-name endpoints take both as query parameters.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;
use crate::http::HttpClient;
use crate::query::{QueryOptions, WithMeta};

// ── Wire types ──────────────────────────────────────────────────────

/// A connect intention between a source and destination service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Intention {
    #[serde(rename = "ID")]
    pub id: Option<String>,
    pub source_name: String,
    pub destination_name: String,
    #[serde(rename = "SourceNS")]
    pub source_ns: Option<String>,
    #[serde(rename = "DestinationNS")]
    pub destination_ns: Option<String>,
    pub source_partition: Option<String>,
    pub destination_partition: Option<String>,
    /// `allow` or `deny`; empty when L7 permissions are present instead.
    pub action: String,
    pub permissions: Option<serde_json::Value>,
    pub description: String,
    pub precedence: i64,
    pub create_index: u64,
    pub modify_index: u64,
}

fn exact_params(source: &str, destination: &str, opts: &QueryOptions) -> Vec<(&'static str, String)> {
    let mut params = opts.params();
    params.push(("source", source.to_owned()));
    params.push(("destination", destination.to_owned()));
    params
}

// ── Endpoints ───────────────────────────────────────────────────────

impl HttpClient {
    /// List all intentions, ordered by precedence.
    ///
    /// `GET /v1/connect/intentions`
    pub async fn intentions(
        &self,
        opts: &QueryOptions,
    ) -> Result<WithMeta<Vec<Intention>>, Error> {
        self.get_with_meta("v1/connect/intentions", opts, &[]).await
    }

    /// Read one intention by exact source/destination pair.
    ///
    /// `GET /v1/connect/intentions/exact?source=&destination=`
    pub async fn intention_exact(
        &self,
        source: &str,
        destination: &str,
        opts: &QueryOptions,
    ) -> Result<WithMeta<Intention>, Error> {
        let mut scoped = opts.clone();
        scoped.index = None;
        scoped.wait = None;
        self.get_with_meta(
            "v1/connect/intentions/exact",
            &scoped,
            &[
                ("source", source.to_owned()),
                ("destination", destination.to_owned()),
            ],
        )
        .await
    }

    /// Create or update an intention by exact name pair.
    ///
    /// `PUT /v1/connect/intentions/exact?source=&destination=`
    pub async fn intention_upsert(
        &self,
        source: &str,
        destination: &str,
        intention: &Intention,
        opts: &QueryOptions,
    ) -> Result<bool, Error> {
        debug!(source, destination, "upserting intention");
        self.put(
            "v1/connect/intentions/exact",
            &exact_params(source, destination, opts),
            intention,
        )
        .await
    }

    /// Delete an intention by exact name pair.
    ///
    /// `DELETE /v1/connect/intentions/exact?source=&destination=`
    pub async fn intention_delete(
        &self,
        source: &str,
        destination: &str,
        opts: &QueryOptions,
    ) -> Result<bool, Error> {
        debug!(source, destination, "deleting intention");
        self.delete(
            "v1/connect/intentions/exact",
            &exact_params(source, destination, opts),
        )
        .await
    }
}
