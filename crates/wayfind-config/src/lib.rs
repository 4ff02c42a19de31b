//! Shared configuration for the wayfind CLI.
//!
//! TOML profiles, token resolution (env + keyring + plaintext),
//! persisted console settings with change notification, and translation
//! to `wayfind_core::ConsoleConfig`.

mod settings;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use wayfind_core::{ConsoleConfig, TlsVerification};

pub use settings::{Settings, SettingsStore, SettingsWatcher};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no profile named '{name}'")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Persisted console settings (scope, blocking toggle, cadences).
    #[serde(default)]
    pub settings: Settings,

    /// Named agent profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            settings: Settings::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile, falling back to a localhost default when the
    /// `default` profile is requested but not configured.
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        if let Some(profile) = self.profiles.get(name) {
            return Ok(profile.clone());
        }
        if name == "default" {
            return Ok(Profile::default());
        }
        Err(ConfigError::UnknownProfile { name: name.into() })
    }
}

/// A named agent profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Agent base URL (e.g., "http://127.0.0.1:8500").
    #[serde(default = "default_server")]
    pub server: String,

    /// ACL token in plaintext. Prefer the keyring or an env var.
    pub token: Option<String>,

    /// Environment variable name containing the token.
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS certificate verification.
    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    pub timeout: Option<u64>,

    /// Pin a datacenter instead of the agent's own.
    pub datacenter: Option<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            server: default_server(),
            token: None,
            token_env: None,
            ca_cert: None,
            insecure: false,
            timeout: None,
            datacenter: None,
        }
    }
}

fn default_server() -> String {
    "http://127.0.0.1:8500".into()
}

// ── Config file paths ───────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "wayfind", "wayfind").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Path of the persisted settings file, next to the config.
pub fn settings_path() -> PathBuf {
    config_path().with_file_name("settings.toml")
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("wayfind");
    p
}

// ── Config loading / saving ─────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();

    // Double-underscore nesting so keys that themselves contain
    // underscores stay addressable: WAYFIND_DEFAULT_PROFILE is the
    // top-level key, WAYFIND_SETTINGS__WAIT_SECS the nested one.
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(&path))
        .merge(Env::prefixed("WAYFIND_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(&path, toml_str)?;
    Ok(())
}

// ── Token resolution ────────────────────────────────────────────────

/// Resolve the ACL token from the credential chain. `None` means
/// anonymous access, which is legitimate against an open agent.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new("wayfind", &format!("{profile_name}/token")) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    profile
        .token
        .as_ref()
        .map(|t| SecretString::from(t.clone()))
}

/// Store a token in the system keyring for a profile.
pub fn store_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new("wayfind", &format!("{profile_name}/token")).map_err(|e| {
        ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        }
    })?;
    entry
        .set_password(token)
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

// ── Translation to ConsoleConfig ────────────────────────────────────

/// Build a `ConsoleConfig` from a profile plus persisted settings,
/// without CLI flag overrides (the CLI layers those on top).
pub fn profile_to_console_config(
    profile: &Profile,
    profile_name: &str,
    settings: &Settings,
) -> Result<ConsoleConfig, ConfigError> {
    let _: url::Url = profile
        .server
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "server".into(),
            reason: format!("invalid URL: {}", profile.server),
        })?;

    let token = resolve_token(profile, profile_name);

    let tls = if profile.insecure {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(ConsoleConfig {
        server: profile.server.clone(),
        token,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(30)),
        datacenter: profile
            .datacenter
            .clone()
            .or_else(|| settings.datacenter.clone()),
        namespace: settings.namespace.clone(),
        partition: settings.partition.clone(),
        blocking: settings.blocking,
        wait: Duration::from_secs(settings.wait_secs),
        poll_interval: Duration::from_secs(settings.poll_interval_secs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_profile_is_localhost() {
        let config = Config::default();
        let profile = config.profile("default").unwrap();
        assert_eq!(profile.server, "http://127.0.0.1:8500");
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let config = Config::default();
        assert!(matches!(
            config.profile("staging"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn profile_translation_carries_settings() {
        let profile = Profile {
            datacenter: Some("dc2".into()),
            timeout: Some(5),
            ..Profile::default()
        };
        let settings = Settings {
            blocking: false,
            wait_secs: 120,
            ..Settings::default()
        };

        let config = profile_to_console_config(&profile, "default", &settings).unwrap();
        assert_eq!(config.datacenter.as_deref(), Some("dc2"));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(!config.blocking);
        assert_eq!(config.wait, Duration::from_secs(120));
    }

    #[test]
    fn env_keys_with_underscores_are_addressable() {
        figment::Jail::expect_with(|jail| {
            // Point the config path away from any real user config.
            jail.set_env("XDG_CONFIG_HOME", jail.directory().display().to_string());
            jail.set_env("HOME", jail.directory().display().to_string());

            jail.set_env("WAYFIND_DEFAULT_PROFILE", "staging");
            jail.set_env("WAYFIND_SETTINGS__WAIT_SECS", "120");

            let config = load_config().expect("config should load from env");
            assert_eq!(config.default_profile.as_deref(), Some("staging"));
            assert_eq!(config.settings.wait_secs, 120);
            Ok(())
        });
    }

    #[test]
    fn invalid_server_url_is_rejected() {
        let profile = Profile {
            server: "not a url".into(),
            ..Profile::default()
        };
        assert!(matches!(
            profile_to_console_config(&profile, "default", &Settings::default()),
            Err(ConfigError::Validation { .. })
        ));
    }
}
