// ── Control-plane HTTP client ──
//
// Verb helpers over reqwest with token injection, query-param scoping,
// blocking-query metadata extraction, and an explicit in-flight
// connection tally. Endpoint bindings live in sibling modules as
// `impl HttpClient` blocks.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::query::{QueryMeta, QueryOptions, WithMeta};
use crate::transport::TransportConfig;

/// Extra request timeout granted on top of a blocking query's `wait`
/// bound, covering network latency around the server-side hold.
const BLOCKING_GRACE: Duration = Duration::from_secs(60);

const TOKEN_HEADER: &str = "X-Consul-Token";

// ── Connection tally ─────────────────────────────────────────────────

/// Counts in-flight requests across everything sharing one client.
///
/// An explicit, observable object rather than hidden global state: the
/// owner of the client can consult `count()` when deciding to tear down
/// subscriptions (e.g. when the blocking toggle flips).
#[derive(Debug, Clone, Default)]
pub struct ConnectionTally {
    inflight: Arc<AtomicUsize>,
}

impl ConnectionTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one in-flight request. The permit releases on drop.
    pub fn acquire(&self) -> ConnectionPermit {
        self.inflight.fetch_add(1, Ordering::Relaxed);
        ConnectionPermit {
            inflight: Arc::clone(&self.inflight),
        }
    }

    /// Number of requests currently in flight.
    pub fn count(&self) -> usize {
        self.inflight.load(Ordering::Relaxed)
    }
}

/// RAII guard for one in-flight request.
#[derive(Debug)]
pub struct ConnectionPermit {
    inflight: Arc<AtomicUsize>,
}

impl Drop for ConnectionPermit {
    fn drop(&mut self) {
        self.inflight.fetch_sub(1, Ordering::Relaxed);
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for a Consul-compatible control-plane HTTP API.
///
/// Cheaply cloneable; watch loops hold their own clone. All endpoints
/// live under `/v1/` on the agent's base URL.
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
    timeout: Duration,
    tally: ConnectionTally,
}

impl HttpClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL, optional ACL token, and transport config.
    pub fn new(
        base_url: &str,
        token: Option<SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            token,
            timeout: transport.timeout,
            tally: ConnectionTally::new(),
        })
    }

    /// Wrap an existing `reqwest::Client` (used by tests against a mock
    /// server; the caller manages TLS).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            token: None,
            timeout: Duration::from_secs(30),
            tally: ConnectionTally::new(),
        })
    }

    /// Replace the ACL token (e.g. after the active token setting changes).
    pub fn with_token(mut self, token: Option<SecretString>) -> Self {
        self.token = token;
        self
    }

    /// The in-flight connection tally shared by all clones.
    pub fn tally(&self) -> ConnectionTally {
        self.tally.clone()
    }

    /// Ensure the base URL ends with a single trailing slash so joining
    /// `v1/...` paths works uniformly.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    fn request(&self, method: reqwest::Method, url: Url) -> reqwest::RequestBuilder {
        let mut builder = self.http.request(method, url);
        if let Some(ref token) = self.token {
            builder = builder.header(TOKEN_HEADER, token.expose_secret());
        }
        builder
    }

    /// Map a send failure, surfacing a deadline overrun as [`Error::Timeout`]
    /// with the timeout that was in force.
    fn send_error(err: reqwest::Error, timeout: Duration) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// One-shot GET without blocking-query metadata.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");

        let _permit = self.tally.acquire();
        let resp = self
            .request(reqwest::Method::GET, url)
            .query(params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Self::send_error(e, self.timeout))?;
        self.handle_response(resp).await
    }

    /// GET with query scoping; returns the body plus parsed `QueryMeta`.
    ///
    /// When `opts` carries a cursor this becomes a blocking query: the
    /// request timeout is widened past the server-side `wait` bound.
    pub async fn get_with_meta<T: DeserializeOwned>(
        &self,
        path: &str,
        opts: &QueryOptions,
        extra: &[(&str, String)],
    ) -> Result<WithMeta<T>, Error> {
        let url = self.url(path)?;
        let mut params = opts.params();
        params.extend(extra.iter().map(|(k, v)| (*k, v.clone())));
        debug!("GET {url} params={params:?}");

        let timeout = match opts.wait {
            Some(wait) if opts.index.is_some() => wait + BLOCKING_GRACE,
            _ => self.timeout,
        };

        let _permit = self.tally.acquire();
        let resp = self
            .request(reqwest::Method::GET, url)
            .query(&params)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| Self::send_error(e, timeout))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(self.parse_error(status, resp).await);
        }

        let meta = QueryMeta::from_headers(resp.headers());
        let body = self.parse_body(resp).await?;
        Ok(WithMeta { body, meta })
    }

    // ── Writes ───────────────────────────────────────────────────────

    pub async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        params: &[(&str, String)],
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url} params={params:?}");

        let _permit = self.tally.acquire();
        let resp = self
            .request(reqwest::Method::PUT, url)
            .query(params)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| Self::send_error(e, self.timeout))?;
        self.handle_response(resp).await
    }

    /// PUT with a raw (non-JSON) body, used by the KV store.
    pub async fn put_raw<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        body: Vec<u8>,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url} params={params:?} ({} bytes)", body.len());

        let _permit = self.tally.acquire();
        let resp = self
            .request(reqwest::Method::PUT, url)
            .query(params)
            .timeout(self.timeout)
            .body(body)
            .send()
            .await
            .map_err(|e| Self::send_error(e, self.timeout))?;
        self.handle_response(resp).await
    }

    /// PUT with no request body (session destroy, token clone, etc.).
    pub async fn put_empty<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("PUT {url} params={params:?}");

        let _permit = self.tally.acquire();
        let resp = self
            .request(reqwest::Method::PUT, url)
            .query(params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Self::send_error(e, self.timeout))?;
        self.handle_response(resp).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        params: &[(&str, String)],
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url} params={params:?}");

        let _permit = self.tally.acquire();
        let resp = self
            .request(reqwest::Method::POST, url)
            .query(params)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| Self::send_error(e, self.timeout))?;
        self.handle_response(resp).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("DELETE {url} params={params:?}");

        let _permit = self.tally.acquire();
        let resp = self
            .request(reqwest::Method::DELETE, url)
            .query(params)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| Self::send_error(e, self.timeout))?;
        self.handle_response(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            self.parse_body(resp).await
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_body<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview = &body[..body.len().min(200)];
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    async fn parse_error(&self, status: StatusCode, resp: reqwest::Response) -> Error {
        let path = resp.url().path().to_owned();
        let raw = resp.text().await.unwrap_or_default();

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                // An agent without ACLs enabled answers 401 with this
                // fixed body; callers route it differently from a token
                // that merely lacks permission.
                if raw.contains("ACL support disabled") {
                    Error::AclDisabled
                } else {
                    Error::PermissionDenied {
                        status: status.as_u16(),
                    }
                }
            }
            StatusCode::NOT_FOUND => Error::NotFound { path },
            _ => Error::Api {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tally_counts_permits() {
        let tally = ConnectionTally::new();
        assert_eq!(tally.count(), 0);

        let a = tally.acquire();
        let b = tally.acquire();
        assert_eq!(tally.count(), 2);

        drop(a);
        assert_eq!(tally.count(), 1);
        drop(b);
        assert_eq!(tally.count(), 0);
    }

    #[test]
    fn tally_shared_across_clones() {
        let tally = ConnectionTally::new();
        let clone = tally.clone();
        let _permit = clone.acquire();
        assert_eq!(tally.count(), 1);
    }
}
