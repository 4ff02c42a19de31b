// Session endpoints
//
// Sessions back KV locks; the admin surface lists them per node and
// force-destroys stuck ones.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Error;
use crate::http::HttpClient;
use crate::query::{QueryOptions, WithMeta};

// ── Wire types ──────────────────────────────────────────────────────

/// A session as returned by `/v1/session/*`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Session {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub node: String,
    pub checks: Option<Vec<String>>,
    /// Lock-release behavior on invalidation: `release` or `delete`.
    pub behavior: String,
    #[serde(rename = "TTL")]
    pub ttl: String,
    pub lock_delay: u64,
    pub create_index: u64,
    pub modify_index: u64,
}

// ── Endpoints ───────────────────────────────────────────────────────

impl HttpClient {
    /// List the sessions held by one node.
    ///
    /// `GET /v1/session/node/:node`
    pub async fn node_sessions(
        &self,
        node: &str,
        opts: &QueryOptions,
    ) -> Result<WithMeta<Vec<Session>>, Error> {
        self.get_with_meta(&format!("v1/session/node/{node}"), opts, &[])
            .await
    }

    /// Read one session by ID. The control plane answers with a
    /// one-element array, empty when the session is gone.
    ///
    /// `GET /v1/session/info/:id`
    pub async fn session_info(
        &self,
        id: &str,
        opts: &QueryOptions,
    ) -> Result<WithMeta<Vec<Session>>, Error> {
        self.get_with_meta(&format!("v1/session/info/{id}"), opts, &[])
            .await
    }

    /// Force-destroy a session, releasing any locks it holds.
    ///
    /// `PUT /v1/session/destroy/:id`
    pub async fn session_destroy(&self, id: &str, opts: &QueryOptions) -> Result<bool, Error> {
        debug!(id, "destroying session");
        self.put_empty(&format!("v1/session/destroy/{id}"), &opts.params())
            .await
    }
}
