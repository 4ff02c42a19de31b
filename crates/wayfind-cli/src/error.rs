//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use wayfind_config::ConfigError;
use wayfind_core::CoreError;

/// Exit codes reported to the shell.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to agent at {url}")]
    #[diagnostic(
        code(wayfind::connection_failed),
        help(
            "Check that the agent is running and accessible.\n\
             URL: {url}\n\
             Try: wayfind catalog datacenters --server {url}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Access ───────────────────────────────────────────────────────

    #[error("Permission denied (HTTP {status})")]
    #[diagnostic(
        code(wayfind::permission_denied),
        help(
            "The active token lacks access to this resource.\n\
             Pass a token with --token or WAYFIND_TOKEN, or store one:\n\
             wayfind config set-token"
        )
    )]
    PermissionDenied { status: u16 },

    #[error("ACL support is disabled on this agent")]
    #[diagnostic(
        code(wayfind::acl_disabled),
        help("Token, policy, and role management need ACLs enabled agent-side.")
    )]
    AclDisabled,

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(wayfind::not_found),
        help("Run: wayfind {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Write rejected: submitted {expected} but the server answered for {got}")]
    #[diagnostic(
        code(wayfind::echo_mismatch),
        help("The agent's answer was for a different identity. Re-read and retry.")
    )]
    EchoMismatch { expected: String, got: String },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error (HTTP {status}): {message}")]
    #[diagnostic(code(wayfind::api_error))]
    ApiError { status: u16, message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(wayfind::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(wayfind::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: wayfind config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(wayfind::config))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(wayfind::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(wayfind::timeout),
        help("Increase timeout with --timeout or check agent responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(wayfind::json), help("Check the JSON contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::AclDisabled => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::EchoMismatch { .. } => exit_code::CONFLICT,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::AccessDenied { status } => CliError::PermissionDenied { status },

            CoreError::AclDisabled => CliError::AclDisabled,

            CoreError::NotFound { resource, name } => CliError::NotFound {
                list_command: list_command_for(&resource),
                resource_type: resource,
                identifier: name,
            },

            CoreError::ReconciliationFailed { expected, got } => {
                CliError::EchoMismatch { expected, got }
            }

            CoreError::Api { status, message } => CliError::ApiError { status, message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::ApiError {
                status: 0,
                message,
            },
        }
    }
}

/// Suggest the listing command matching a missing resource kind.
fn list_command_for(resource: &str) -> String {
    match resource {
        "node" => "catalog nodes".into(),
        "service" => "catalog services".into(),
        "key" | "prefix" => "kv list".into(),
        "token" => "acl tokens list".into(),
        "policy" => "acl policies list".into(),
        "role" => "acl roles list".into(),
        "intention" => "intention list".into(),
        "session" => "session list --node <node>".into(),
        other => format!("{other} list"),
    }
}
