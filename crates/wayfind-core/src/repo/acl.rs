// ── ACL repositories: tokens, policies, roles ──
//
// Writes compare the server echo against the submitted identity and
// reject a mismatch before it can poison the store.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

use wayfind_api::query::{QueryOptions, WithMeta};
use wayfind_api::watch::{WatchConfig, WatchHandle, Watcher};
use wayfind_api::HttpClient;

use super::named_not_found;
use crate::error::CoreError;
use crate::model::{Policy, Role, Token};
use crate::store::DataStore;

// ── Tokens ───────────────────────────────────────────────────────────

pub struct TokenRepo {
    pub(crate) client: HttpClient,
    pub(crate) store: Arc<DataStore>,
    pub(crate) scope: QueryOptions,
    pub(crate) datacenter: String,
    pub(crate) watch_cfg: WatchConfig,
    pub(crate) watch_scope: CancellationToken,
}

impl TokenRepo {
    /// List token stubs (no secrets); replaces the token collection.
    pub async fn find_all(&self) -> Result<Arc<Vec<Arc<Token>>>, CoreError> {
        let page = self.client.acl_tokens(&self.scope).await?;
        let tokens: Vec<Token> = page
            .body
            .into_iter()
            .filter_map(|w| Token::from_wire(w, &self.datacenter))
            .collect();
        debug!(count = tokens.len(), "refreshed acl tokens");

        self.store
            .tokens
            .replace_all(tokens.into_iter().map(|t| (t.key.fingerprint(), t)));
        Ok(self.store.tokens_snapshot())
    }

    /// Read one token, secret included.
    pub async fn find(&self, accessor: &Uuid) -> Result<Token, CoreError> {
        let page = self
            .client
            .acl_token(accessor, &self.scope)
            .await
            .map_err(|e| named_not_found(e, "token", &accessor.to_string()))?;

        let token = Token::from_wire(page.body, &self.datacenter)
            .ok_or_else(|| CoreError::Internal("token without accessor id".into()))?;
        self.reconcile(accessor, &token)?;
        self.store
            .tokens
            .upsert(token.key.fingerprint(), token.clone());
        Ok(token)
    }

    /// Create a token; the echo carries the generated accessor/secret.
    pub async fn create(&self, token: &Token) -> Result<Token, CoreError> {
        let echo = self.client.acl_token_create(&token.to_wire(), &self.scope).await?;
        let created = Token::from_wire(echo, &self.datacenter)
            .ok_or_else(|| CoreError::Internal("create echo without accessor id".into()))?;
        self.store
            .tokens
            .upsert(created.key.fingerprint(), created.clone());
        Ok(created)
    }

    pub async fn update(&self, token: &Token) -> Result<Token, CoreError> {
        let echo = self
            .client
            .acl_token_update(&token.accessor, &token.to_wire(), &self.scope)
            .await
            .map_err(|e| named_not_found(e, "token", &token.accessor.to_string()))?;

        let updated = Token::from_wire(echo, &self.datacenter)
            .ok_or_else(|| CoreError::Internal("update echo without accessor id".into()))?;
        self.reconcile(&token.accessor, &updated)?;
        self.store
            .tokens
            .upsert(updated.key.fingerprint(), updated.clone());
        Ok(updated)
    }

    pub async fn remove(&self, accessor: &Uuid, key_fingerprint: &str) -> Result<(), CoreError> {
        self.client
            .acl_token_delete(accessor, &self.scope)
            .await
            .map_err(|e| named_not_found(e, "token", &accessor.to_string()))?;
        self.store.tokens.remove(key_fingerprint);
        Ok(())
    }

    /// Clone a token, yielding a fresh accessor/secret pair.
    pub async fn duplicate(&self, accessor: &Uuid) -> Result<Token, CoreError> {
        let echo = self
            .client
            .acl_token_clone(accessor, &self.scope)
            .await
            .map_err(|e| named_not_found(e, "token", &accessor.to_string()))?;

        let cloned = Token::from_wire(echo, &self.datacenter)
            .ok_or_else(|| CoreError::Internal("clone echo without accessor id".into()))?;
        self.store
            .tokens
            .upsert(cloned.key.fingerprint(), cloned.clone());
        Ok(cloned)
    }

    /// Follow the token listing with blocking queries.
    pub fn watch_all(&self) -> WatchHandle<Vec<Token>> {
        let client = self.client.clone();
        let store = Arc::clone(&self.store);
        let datacenter = self.datacenter.clone();
        Watcher::spawn_scoped(
            move |opts: QueryOptions| {
                let client = client.clone();
                let store = Arc::clone(&store);
                let datacenter = datacenter.clone();
                async move {
                    let page = client.acl_tokens(&opts).await?;
                    let tokens: Vec<Token> = page
                        .body
                        .into_iter()
                        .filter_map(|w| Token::from_wire(w, &datacenter))
                        .collect();
                    store
                        .tokens
                        .replace_all(tokens.iter().map(|t| (t.key.fingerprint(), t.clone())));
                    Ok(WithMeta {
                        body: tokens,
                        meta: page.meta,
                    })
                }
            },
            self.scope.clone(),
            self.watch_cfg.clone(),
            &self.watch_scope,
        )
    }

    fn reconcile(&self, expected: &Uuid, echo: &Token) -> Result<(), CoreError> {
        if echo.accessor == *expected {
            Ok(())
        } else {
            Err(CoreError::ReconciliationFailed {
                expected: expected.to_string(),
                got: echo.accessor.to_string(),
            })
        }
    }
}

// ── Policies ─────────────────────────────────────────────────────────

pub struct PolicyRepo {
    pub(crate) client: HttpClient,
    pub(crate) store: Arc<DataStore>,
    pub(crate) scope: QueryOptions,
    pub(crate) datacenter: String,
}

impl PolicyRepo {
    pub async fn find_all(&self) -> Result<Arc<Vec<Arc<Policy>>>, CoreError> {
        let page = self.client.acl_policies(&self.scope).await?;
        let policies: Vec<Policy> = page
            .body
            .into_iter()
            .map(|w| Policy::from_wire(w, &self.datacenter))
            .collect();

        self.store
            .policies
            .replace_all(policies.into_iter().map(|p| (p.key.fingerprint(), p)));
        Ok(self.store.policies_snapshot())
    }

    pub async fn find(&self, id: &Uuid) -> Result<Policy, CoreError> {
        let page = self
            .client
            .acl_policy(id, &self.scope)
            .await
            .map_err(|e| named_not_found(e, "policy", &id.to_string()))?;

        let policy = Policy::from_wire(page.body, &self.datacenter);
        self.store
            .policies
            .upsert(policy.key.fingerprint(), policy.clone());
        Ok(policy)
    }

    pub async fn create(&self, policy: &Policy) -> Result<Policy, CoreError> {
        let echo = self
            .client
            .acl_policy_create(&policy.to_wire(), &self.scope)
            .await?;
        let created = Policy::from_wire(echo, &self.datacenter);

        // The echo must answer for the policy we submitted.
        if created.name != policy.name {
            return Err(CoreError::ReconciliationFailed {
                expected: policy.name.clone(),
                got: created.name,
            });
        }
        self.store
            .policies
            .upsert(created.key.fingerprint(), created.clone());
        Ok(created)
    }

    pub async fn update(&self, policy: &Policy) -> Result<Policy, CoreError> {
        let id = policy
            .id
            .ok_or_else(|| CoreError::Internal("update of a policy without an id".into()))?;
        let echo = self
            .client
            .acl_policy_update(&id, &policy.to_wire(), &self.scope)
            .await
            .map_err(|e| named_not_found(e, "policy", &policy.name))?;

        let updated = Policy::from_wire(echo, &self.datacenter);
        self.store
            .policies
            .upsert(updated.key.fingerprint(), updated.clone());
        Ok(updated)
    }

    pub async fn remove(&self, id: &Uuid, key_fingerprint: &str) -> Result<(), CoreError> {
        self.client
            .acl_policy_delete(id, &self.scope)
            .await
            .map_err(|e| named_not_found(e, "policy", &id.to_string()))?;
        self.store.policies.remove(key_fingerprint);
        Ok(())
    }
}

// ── Roles ────────────────────────────────────────────────────────────

pub struct RoleRepo {
    pub(crate) client: HttpClient,
    pub(crate) store: Arc<DataStore>,
    pub(crate) scope: QueryOptions,
    pub(crate) datacenter: String,
}

impl RoleRepo {
    pub async fn find_all(&self) -> Result<Arc<Vec<Arc<Role>>>, CoreError> {
        let page = self.client.acl_roles(&self.scope).await?;
        let roles: Vec<Role> = page
            .body
            .into_iter()
            .map(|w| Role::from_wire(w, &self.datacenter))
            .collect();

        self.store
            .roles
            .replace_all(roles.into_iter().map(|r| (r.key.fingerprint(), r)));
        Ok(self.store.roles_snapshot())
    }

    pub async fn find(&self, id: &Uuid) -> Result<Role, CoreError> {
        let page = self
            .client
            .acl_role(id, &self.scope)
            .await
            .map_err(|e| named_not_found(e, "role", &id.to_string()))?;

        let role = Role::from_wire(page.body, &self.datacenter);
        self.store.roles.upsert(role.key.fingerprint(), role.clone());
        Ok(role)
    }

    pub async fn create(&self, role: &Role) -> Result<Role, CoreError> {
        let echo = self.client.acl_role_create(&role.to_wire(), &self.scope).await?;
        let created = Role::from_wire(echo, &self.datacenter);

        if created.name != role.name {
            return Err(CoreError::ReconciliationFailed {
                expected: role.name.clone(),
                got: created.name,
            });
        }
        self.store
            .roles
            .upsert(created.key.fingerprint(), created.clone());
        Ok(created)
    }

    pub async fn update(&self, role: &Role) -> Result<Role, CoreError> {
        let id = role
            .id
            .ok_or_else(|| CoreError::Internal("update of a role without an id".into()))?;
        let echo = self
            .client
            .acl_role_update(&id, &role.to_wire(), &self.scope)
            .await
            .map_err(|e| named_not_found(e, "role", &role.name))?;

        let updated = Role::from_wire(echo, &self.datacenter);
        self.store
            .roles
            .upsert(updated.key.fingerprint(), updated.clone());
        Ok(updated)
    }

    pub async fn remove(&self, id: &Uuid, key_fingerprint: &str) -> Result<(), CoreError> {
        self.client
            .acl_role_delete(id, &self.scope)
            .await
            .map_err(|e| named_not_found(e, "role", &id.to_string()))?;
        self.store.roles.remove(key_fingerprint);
        Ok(())
    }
}
