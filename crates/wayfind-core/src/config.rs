// ── Console configuration ──
//
// Everything the Console needs to reach one agent: address, token, TLS
// posture, scope (datacenter/namespace/partition), and the watch tuning
// that the blocking toggle flips at runtime.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use wayfind_api::query::QueryOptions;
use wayfind_api::transport::{TlsMode, TransportConfig};
use wayfind_api::watch::WatchConfig;

/// TLS verification mode for the agent connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// Use the system trust store (default).
    #[default]
    SystemDefaults,
    /// Trust a custom CA certificate (PEM file).
    CustomCa(PathBuf),
    /// Skip certificate verification entirely.
    DangerAcceptInvalid,
}

/// Configuration for a [`Console`](crate::Console).
#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Agent base URL, e.g. `http://127.0.0.1:8500`.
    pub server: String,
    /// ACL token sent as `X-Consul-Token`; `None` for anonymous.
    pub token: Option<SecretString>,
    pub tls: TlsVerification,
    /// One-shot request timeout. Blocking queries widen this internally.
    pub timeout: Duration,

    /// Scope applied to every query.
    pub datacenter: Option<String>,
    pub namespace: Option<String>,
    pub partition: Option<String>,

    /// Whether subscriptions use server-side blocking queries.
    pub blocking: bool,
    /// Server-side hold bound for blocking queries.
    pub wait: Duration,
    /// Fetch cadence when blocking is disabled.
    pub poll_interval: Duration,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            server: "http://127.0.0.1:8500".into(),
            token: None,
            tls: TlsVerification::SystemDefaults,
            timeout: Duration::from_secs(30),
            datacenter: None,
            namespace: None,
            partition: None,
            blocking: true,
            wait: Duration::from_secs(300),
            poll_interval: Duration::from_secs(10),
        }
    }
}

impl ConsoleConfig {
    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(ref path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }

    /// The base query scope every repository call starts from.
    pub(crate) fn scope(&self) -> QueryOptions {
        QueryOptions {
            datacenter: self.datacenter.clone(),
            namespace: self.namespace.clone(),
            partition: self.partition.clone(),
            ..QueryOptions::default()
        }
    }

    /// Watch tuning for the given blocking mode.
    pub(crate) fn watch_config(&self, blocking: bool) -> WatchConfig {
        WatchConfig {
            blocking,
            wait: self.wait,
            poll_interval: self.poll_interval,
            ..WatchConfig::default()
        }
    }
}
