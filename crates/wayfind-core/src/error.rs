// ── Core error types ──
//
// User-facing errors from wayfind-core. These are NOT wire-specific --
// consumers never see raw reqwest failures or JSON parse errors. The
// `From<wayfind_api::Error>` impl translates transport-layer errors
// into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to agent at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Access errors ────────────────────────────────────────────────
    /// The token lacks permission (HTTP 401/403). Consumers treat this
    /// as a signal to prompt for a token, not as a fatal failure.
    #[error("Permission denied (HTTP {status}): the active token lacks access")]
    AccessDenied { status: u16 },

    /// The agent runs without ACLs; token management is unavailable.
    #[error("ACL support is disabled on this agent")]
    AclDisabled,

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{resource} not found: {name}")]
    NotFound { resource: String, name: String },

    /// A write's server echo did not match the submitted identity.
    #[error("Write rejected: submitted {expected} but the server answered for {got}")]
    ReconciliationFailed { expected: String, got: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn not_found(resource: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            name: name.into(),
        }
    }

    /// Whether the error means the active token should be replaced.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::AccessDenied { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<wayfind_api::Error> for CoreError {
    fn from(err: wayfind_api::Error) -> Self {
        match err {
            wayfind_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        status: e.status().map_or(0, |s| s.as_u16()),
                        message: e.to_string(),
                    }
                }
            }
            wayfind_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            wayfind_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            wayfind_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            wayfind_api::Error::PermissionDenied { status } => CoreError::AccessDenied { status },
            wayfind_api::Error::AclDisabled => CoreError::AclDisabled,
            wayfind_api::Error::NotFound { path } => CoreError::NotFound {
                resource: "resource".into(),
                name: path,
            },
            wayfind_api::Error::Api { status, message } => CoreError::Api { status, message },
            wayfind_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            wayfind_api::Error::InvalidValue { key } => CoreError::Internal(format!(
                "Value for key {key:?} is not valid base64"
            )),
        }
    }
}
