//! Config subcommand handlers.

use dialoguer::{Input, Password};

use wayfind_config::{self as config, Config, Profile, SettingsStore};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn active_profile_name(global: &GlobalOpts, cfg: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("wayfind configuration wizard");
            eprintln!("  Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let server: String = Input::new()
                .with_prompt("Agent URL")
                .default("http://127.0.0.1:8500".into())
                .interact_text()
                .map_err(prompt_err)?;

            let _: url::Url = server.parse().map_err(|_| CliError::Validation {
                field: "server".into(),
                reason: format!("invalid URL: {server}"),
            })?;

            let token = Password::new()
                .with_prompt("ACL token (empty for anonymous)")
                .allow_empty_password(true)
                .interact()
                .map_err(prompt_err)?;

            let token_field = if token.is_empty() {
                None
            } else {
                let store_choices = &[
                    "Store in system keyring (recommended)",
                    "Save to config file (plaintext)",
                ];
                let selection = dialoguer::Select::new()
                    .with_prompt("Where to store the token?")
                    .items(store_choices)
                    .default(0)
                    .interact()
                    .map_err(prompt_err)?;

                if selection == 0 {
                    config::store_token(&profile_name, &token)?;
                    eprintln!("  Token stored in system keyring");
                    None
                } else {
                    Some(token)
                }
            };

            let datacenter: String = Input::new()
                .with_prompt("Datacenter (empty for the agent's own)")
                .allow_empty(true)
                .default(String::new())
                .interact_text()
                .map_err(prompt_err)?;

            let profile = Profile {
                server,
                token: token_field,
                datacenter: (!datacenter.is_empty()).then_some(datacenter),
                ..Profile::default()
            };

            let mut cfg = config::load_config_or_default();
            cfg.default_profile = Some(profile_name.clone());
            cfg.profiles.insert(profile_name.clone(), profile);
            config::save_config(&cfg)?;

            eprintln!("\nConfiguration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: wayfind catalog datacenters");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| format!("{c:#?}"),
                |_| "config".into(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            // Persisted console settings live next to the profile file.
            if matches!(
                key.as_str(),
                "blocking" | "wait" | "poll-interval" | "poll_interval" | "namespace" | "partition"
            ) {
                return set_setting(&key, value, global);
            }

            let mut cfg = config::load_config_or_default();
            let profile_name = active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            match key.as_str() {
                "server" => profile.server = value,
                "token" => profile.token = Some(value),
                "token_env" | "token-env" => profile.token_env = Some(value),
                "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
                "datacenter" => profile.datacenter = Some(value),
                "insecure" => {
                    profile.insecure = value.parse().map_err(|_| CliError::Validation {
                        field: "insecure".into(),
                        reason: "must be 'true' or 'false'".into(),
                    })?;
                }
                "timeout" => {
                    profile.timeout = Some(value.parse().map_err(|_| CliError::Validation {
                        field: "timeout".into(),
                        reason: "must be a number (seconds)".into(),
                    })?);
                }
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: server, token, \
                             token_env, ca_cert, datacenter, insecure, timeout, blocking, \
                             wait, poll-interval, namespace, partition"
                        ),
                    });
                }
            }

            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("Set {key} on profile '{profile_name}'");
            }
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: wayfind config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                let available: Vec<_> = cfg.profiles.keys().cloned().collect();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!("Default profile set to '{name}'");
            }
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| active_profile_name(global, &cfg));

            let token = Password::new()
                .with_prompt("ACL token")
                .interact()
                .map_err(prompt_err)?;

            if token.is_empty() {
                return Err(CliError::Validation {
                    field: "token".into(),
                    reason: "token cannot be empty".into(),
                });
            }

            config::store_token(&profile_name, &token)?;
            eprintln!("Token stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}

/// Route a persisted-settings key to the settings store.
fn set_setting(key: &str, value: String, global: &GlobalOpts) -> Result<(), CliError> {
    let store = SettingsStore::open(config::settings_path());

    let numeric = |field: &str, value: &str| -> Result<u64, CliError> {
        value.parse().map_err(|_| CliError::Validation {
            field: field.into(),
            reason: "must be a number (seconds)".into(),
        })
    };

    match key {
        "blocking" => {
            let blocking: bool = value.parse().map_err(|_| CliError::Validation {
                field: "blocking".into(),
                reason: "must be 'true' or 'false'".into(),
            })?;
            store.update(|s| s.blocking = blocking)?;
        }
        "wait" => {
            let secs = numeric("wait", &value)?;
            store.update(|s| s.wait_secs = secs)?;
        }
        "poll-interval" | "poll_interval" => {
            let secs = numeric("poll-interval", &value)?;
            store.update(|s| s.poll_interval_secs = secs)?;
        }
        "namespace" => {
            store.update(|s| s.namespace = (!value.is_empty()).then(|| value.clone()))?;
        }
        "partition" => {
            store.update(|s| s.partition = (!value.is_empty()).then(|| value.clone()))?;
        }
        _ => unreachable!(),
    }

    if !global.quiet {
        eprintln!("Set {key} in {}", config::settings_path().display());
    }
    Ok(())
}
