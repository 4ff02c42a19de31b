// ACL endpoints: tokens, policies, roles
//
// Token listings return stubs without the secret; reads return the full
// token. Deletes answer a bare JSON boolean.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::Error;
use crate::http::HttpClient;
use crate::query::{QueryOptions, WithMeta};

// ── Wire types ──────────────────────────────────────────────────────

/// Reference to a policy or role attached to a token.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AclLink {
    #[serde(rename = "ID")]
    pub id: Option<String>,
    pub name: Option<String>,
}

/// An ACL token. `secret_id` is absent in listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AclToken {
    #[serde(rename = "AccessorID")]
    pub accessor_id: Option<Uuid>,
    #[serde(rename = "SecretID", skip_serializing_if = "Option::is_none")]
    pub secret_id: Option<Uuid>,
    pub description: String,
    pub policies: Option<Vec<AclLink>>,
    pub roles: Option<Vec<AclLink>>,
    pub local: bool,
    pub create_time: Option<DateTime<Utc>>,
    pub create_index: u64,
    pub modify_index: u64,
    pub namespace: Option<String>,
    pub partition: Option<String>,
}

/// An ACL policy with its rule document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AclPolicy {
    #[serde(rename = "ID")]
    pub id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub rules: String,
    pub datacenters: Option<Vec<String>>,
    pub create_index: u64,
    pub modify_index: u64,
    pub namespace: Option<String>,
    pub partition: Option<String>,
}

/// An ACL role bundling policies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AclRole {
    #[serde(rename = "ID")]
    pub id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub policies: Option<Vec<AclLink>>,
    pub create_index: u64,
    pub modify_index: u64,
    pub namespace: Option<String>,
    pub partition: Option<String>,
}

// ── Token endpoints ─────────────────────────────────────────────────

impl HttpClient {
    /// List token stubs (no secrets).
    ///
    /// `GET /v1/acl/tokens`
    pub async fn acl_tokens(
        &self,
        opts: &QueryOptions,
    ) -> Result<WithMeta<Vec<AclToken>>, Error> {
        self.get_with_meta("v1/acl/tokens", opts, &[]).await
    }

    /// Read one token by accessor ID.
    ///
    /// `GET /v1/acl/token/:accessor`
    pub async fn acl_token(
        &self,
        accessor: &Uuid,
        opts: &QueryOptions,
    ) -> Result<WithMeta<AclToken>, Error> {
        self.get_with_meta(&format!("v1/acl/token/{accessor}"), opts, &[])
            .await
    }

    /// Create a token; the echo carries the generated accessor/secret.
    ///
    /// `PUT /v1/acl/token`
    pub async fn acl_token_create(
        &self,
        token: &AclToken,
        opts: &QueryOptions,
    ) -> Result<AclToken, Error> {
        debug!("creating acl token");
        self.put("v1/acl/token", &opts.params(), token).await
    }

    /// Update an existing token.
    ///
    /// `PUT /v1/acl/token/:accessor`
    pub async fn acl_token_update(
        &self,
        accessor: &Uuid,
        token: &AclToken,
        opts: &QueryOptions,
    ) -> Result<AclToken, Error> {
        self.put(&format!("v1/acl/token/{accessor}"), &opts.params(), token)
            .await
    }

    /// Delete a token.
    ///
    /// `DELETE /v1/acl/token/:accessor`
    pub async fn acl_token_delete(
        &self,
        accessor: &Uuid,
        opts: &QueryOptions,
    ) -> Result<bool, Error> {
        self.delete(&format!("v1/acl/token/{accessor}"), &opts.params())
            .await
    }

    /// Clone a token, yielding a new accessor/secret pair.
    ///
    /// `PUT /v1/acl/token/:accessor/clone`
    pub async fn acl_token_clone(
        &self,
        accessor: &Uuid,
        opts: &QueryOptions,
    ) -> Result<AclToken, Error> {
        self.put_empty(&format!("v1/acl/token/{accessor}/clone"), &opts.params())
            .await
    }
}

// ── Policy endpoints ────────────────────────────────────────────────

impl HttpClient {
    /// `GET /v1/acl/policies`
    pub async fn acl_policies(
        &self,
        opts: &QueryOptions,
    ) -> Result<WithMeta<Vec<AclPolicy>>, Error> {
        self.get_with_meta("v1/acl/policies", opts, &[]).await
    }

    /// `GET /v1/acl/policy/:id`
    pub async fn acl_policy(
        &self,
        id: &Uuid,
        opts: &QueryOptions,
    ) -> Result<WithMeta<AclPolicy>, Error> {
        self.get_with_meta(&format!("v1/acl/policy/{id}"), opts, &[])
            .await
    }

    /// `PUT /v1/acl/policy`
    pub async fn acl_policy_create(
        &self,
        policy: &AclPolicy,
        opts: &QueryOptions,
    ) -> Result<AclPolicy, Error> {
        debug!(name = %policy.name, "creating acl policy");
        self.put("v1/acl/policy", &opts.params(), policy).await
    }

    /// `PUT /v1/acl/policy/:id`
    pub async fn acl_policy_update(
        &self,
        id: &Uuid,
        policy: &AclPolicy,
        opts: &QueryOptions,
    ) -> Result<AclPolicy, Error> {
        self.put(&format!("v1/acl/policy/{id}"), &opts.params(), policy)
            .await
    }

    /// `DELETE /v1/acl/policy/:id`
    pub async fn acl_policy_delete(&self, id: &Uuid, opts: &QueryOptions) -> Result<bool, Error> {
        self.delete(&format!("v1/acl/policy/{id}"), &opts.params())
            .await
    }
}

// ── Role endpoints ──────────────────────────────────────────────────

impl HttpClient {
    /// `GET /v1/acl/roles`
    pub async fn acl_roles(&self, opts: &QueryOptions) -> Result<WithMeta<Vec<AclRole>>, Error> {
        self.get_with_meta("v1/acl/roles", opts, &[]).await
    }

    /// `GET /v1/acl/role/:id`
    pub async fn acl_role(
        &self,
        id: &Uuid,
        opts: &QueryOptions,
    ) -> Result<WithMeta<AclRole>, Error> {
        self.get_with_meta(&format!("v1/acl/role/{id}"), opts, &[])
            .await
    }

    /// `PUT /v1/acl/role`
    pub async fn acl_role_create(
        &self,
        role: &AclRole,
        opts: &QueryOptions,
    ) -> Result<AclRole, Error> {
        debug!(name = %role.name, "creating acl role");
        self.put("v1/acl/role", &opts.params(), role).await
    }

    /// `PUT /v1/acl/role/:id`
    pub async fn acl_role_update(
        &self,
        id: &Uuid,
        role: &AclRole,
        opts: &QueryOptions,
    ) -> Result<AclRole, Error> {
        self.put(&format!("v1/acl/role/{id}"), &opts.params(), role)
            .await
    }

    /// `DELETE /v1/acl/role/:id`
    pub async fn acl_role_delete(&self, id: &Uuid, opts: &QueryOptions) -> Result<bool, Error> {
        self.delete(&format!("v1/acl/role/{id}"), &opts.params())
            .await
    }
}
