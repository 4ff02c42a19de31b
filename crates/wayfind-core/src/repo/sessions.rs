// ── Session repository ──

use std::sync::Arc;

use tracing::debug;

use wayfind_api::query::QueryOptions;
use wayfind_api::HttpClient;

use super::named_not_found;
use crate::error::CoreError;
use crate::model::{ResourceKey, Session};
use crate::store::DataStore;

pub struct SessionRepo {
    pub(crate) client: HttpClient,
    pub(crate) store: Arc<DataStore>,
    pub(crate) scope: QueryOptions,
    pub(crate) datacenter: String,
}

impl SessionRepo {
    /// Sessions held by one node.
    pub async fn for_node(&self, node: &str) -> Result<Vec<Session>, CoreError> {
        let page = self
            .client
            .node_sessions(node, &self.scope)
            .await
            .map_err(|e| named_not_found(e, "node", node))?;

        let sessions: Vec<Session> = page
            .body
            .into_iter()
            .map(|w| Session::from_wire(w, &self.datacenter))
            .collect();
        for session in &sessions {
            self.store
                .sessions
                .upsert(session.key.fingerprint(), session.clone());
        }
        Ok(sessions)
    }

    /// Read one session by ID. The control plane answers with an empty
    /// array once the session is gone.
    pub async fn info(&self, id: &str) -> Result<Session, CoreError> {
        let page = self
            .client
            .session_info(id, &self.scope)
            .await
            .map_err(|e| named_not_found(e, "session", id))?;

        let session = page
            .body
            .into_iter()
            .next()
            .map(|w| Session::from_wire(w, &self.datacenter))
            .ok_or_else(|| CoreError::not_found("session", id))?;

        self.store
            .sessions
            .upsert(session.key.fingerprint(), session.clone());
        Ok(session)
    }

    /// Force-destroy a session, releasing any locks it holds.
    pub async fn destroy(&self, id: &str) -> Result<(), CoreError> {
        self.client
            .session_destroy(id, &self.scope)
            .await
            .map_err(|e| named_not_found(e, "session", id))?;
        debug!(id, "session destroyed");

        let fingerprint = ResourceKey::named(&self.datacenter, id).fingerprint();
        self.store.sessions.remove(&fingerprint);
        Ok(())
    }
}
