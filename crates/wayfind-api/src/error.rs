use thiserror::Error;

/// Top-level error type for the `wayfind-api` crate.
///
/// Distinguishes transport failures (retriable inside watch loops) from
/// HTTP-status failures (surfaced to callers for branch-specific handling:
/// access-control redirects, not-found, validation). `wayfind-core` maps
/// these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Access control ──────────────────────────────────────────────
    /// Token lacks permission for this resource (HTTP 401/403).
    ///
    /// Consumers treat this as a redirect signal (back to token entry),
    /// not a hard failure, and must never retry automatically.
    #[error("Permission denied (HTTP {status})")]
    PermissionDenied { status: u16 },

    /// The control plane has ACLs disabled entirely (401 with the
    /// well-known body). Also a redirect signal for consumers.
    #[error("ACL support disabled on the control plane")]
    AclDisabled,

    // ── Resources ───────────────────────────────────────────────────
    /// Slug lookup returned HTTP 404.
    #[error("Not found: {path}")]
    NotFound { path: String },

    // ── API ─────────────────────────────────────────────────────────
    /// Any other non-success status, with the response body as message.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A KV value was not valid base64.
    #[error("Invalid base64 value for key '{key}'")]
    InvalidValue { key: String },
}

impl Error {
    /// Returns `true` if this is a transport-level failure worth retrying
    /// once connectivity is restored. HTTP-status errors are never
    /// transient: the caller decides what a 403 or 500 means.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.status().is_none(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` for 401/403 and the ACL-disabled signal.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. } | Self::AclDisabled)
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::PermissionDenied { status } | Self::Api { status, .. } => Some(*status),
            Self::AclDisabled => Some(401),
            Self::NotFound { .. } => Some(404),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
