mod cli;
mod commands;
mod error;
mod output;

use clap::Parser;
use secrecy::SecretString;
use tracing_subscriber::EnvFilter;

use wayfind_core::{Console, ConsoleConfig, TlsVerification};

use crate::cli::{Cli, Command, GlobalOpts};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need an agent connection
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "wayfind", &mut std::io::stdout());
            Ok(())
        }

        // All other commands require an agent connection
        cmd => {
            let config = build_console_config(&cli.global)?;
            let console = Console::new(config)?;
            console.connect().await?;

            tracing::debug!(command = ?cmd, "dispatching command");
            let result = commands::dispatch(cmd, &console, &cli.global).await;
            console.close();
            result
        }
    }
}

/// Build a `ConsoleConfig` from the config file, persisted settings, and
/// CLI flag overrides.
fn build_console_config(global: &GlobalOpts) -> Result<ConsoleConfig, CliError> {
    let cfg = wayfind_config::load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = cfg.profile(&profile_name).map_err(|_| {
        let available: Vec<_> = cfg.profiles.keys().cloned().collect();
        CliError::ProfileNotFound {
            name: profile_name.clone(),
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        }
    })?;

    let settings = wayfind_config::SettingsStore::open(wayfind_config::settings_path()).get();
    let mut config = wayfind_config::profile_to_console_config(&profile, &profile_name, &settings)?;

    // Flags win over the profile.
    if let Some(ref server) = global.server {
        let _: url::Url = server.parse().map_err(|_| CliError::Validation {
            field: "server".into(),
            reason: format!("invalid URL: {server}"),
        })?;
        config.server = server.clone();
    }
    if let Some(ref token) = global.token {
        config.token = Some(SecretString::from(token.clone()));
    }
    if let Some(ref dc) = global.datacenter {
        config.datacenter = Some(dc.clone());
    }
    if let Some(ref ns) = global.namespace {
        config.namespace = Some(ns.clone());
    }
    if let Some(ref part) = global.partition {
        config.partition = Some(part.clone());
    }
    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(timeout) = global.timeout {
        config.timeout = std::time::Duration::from_secs(timeout);
    }

    Ok(config)
}

/// Resolve the active profile name from CLI flags and config.
fn active_profile_name(global: &GlobalOpts, cfg: &wayfind_config::Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}
