//! Watch command handlers: follow a resource until Ctrl-C.
//!
//! Table/plain output prints one summary line per dispatched update;
//! JSON modes emit one JSON document per update for piping.

use owo_colors::OwoColorize;
use serde::Serialize;

use wayfind_api::query::WithMeta;
use wayfind_api::watch::{WatchEvent, WatchHandle};
use wayfind_core::Console;
use wayfind_core::model::CheckStatus;

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs, WatchCommand};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    console: &Console,
    args: WatchArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        WatchCommand::Nodes => {
            let handle = console.nodes().watch_all();
            follow(handle, global, |nodes| {
                let worst = nodes.iter().map(|n| n.status()).max();
                (format!("{} nodes", nodes.len()), worst)
            })
            .await
        }

        WatchCommand::Services => {
            let handle = console.services().watch_all();
            follow(handle, global, |services| {
                let worst = services.iter().map(|s| s.status()).max();
                (format!("{} services", services.len()), worst)
            })
            .await
        }

        WatchCommand::Service { name } => {
            let handle = console.services().watch_instances(&name);
            follow(handle, global, move |instances| {
                let worst = instances.iter().map(|i| i.status()).max();
                (format!("{} instances of {name}", instances.len()), worst)
            })
            .await
        }

        WatchCommand::Kv { prefix } => {
            let handle = console.kv().watch(&prefix);
            follow(handle, global, move |entries| {
                (format!("{} entries under '{prefix}'", entries.len()), None)
            })
            .await
        }
    }
}

/// Drain a watch handle until it closes or the user hits Ctrl-C.
async fn follow<T: Serialize>(
    mut handle: WatchHandle<Vec<T>>,
    global: &GlobalOpts,
    summarize: impl Fn(&[T]) -> (String, Option<CheckStatus>),
) -> Result<(), CliError> {
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                handle.close();
                break;
            }
            event = handle.next() => match event {
                Some(WatchEvent::Data(page)) => print_update(&page, global, &summarize),

                Some(WatchEvent::Error(err)) if err.is_transient() => {
                    eprintln!("reconnecting: {err}");
                }

                // HTTP-status failures close the subscription; surface
                // the reason with the matching exit code.
                Some(WatchEvent::Error(err)) => return Err(terminal_error(&err)),

                None => break,
            }
        }
    }
    Ok(())
}

fn print_update<T: Serialize>(
    page: &WithMeta<Vec<T>>,
    global: &GlobalOpts,
    summarize: &impl Fn(&[T]) -> (String, Option<CheckStatus>),
) {
    match global.output {
        OutputFormat::Json | OutputFormat::JsonCompact => {
            if let Ok(line) = serde_json::to_string(&page.body) {
                output::print_output(&line, global.quiet);
            }
        }
        _ => {
            let (summary, worst) = summarize(&page.body);
            let cursor = page
                .meta
                .index
                .as_ref()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".into());
            let line = format!(
                "{} {} {} (index {})",
                chrono::Local::now().format("%H:%M:%S"),
                status_glyph(worst),
                summary,
                cursor
            );
            output::print_output(&line, global.quiet);
        }
    }
}

fn status_glyph(status: Option<CheckStatus>) -> String {
    let glyph = "●";
    if !output::use_color() {
        return glyph.into();
    }
    match status {
        Some(CheckStatus::Critical) => glyph.red().to_string(),
        Some(CheckStatus::Warning) => glyph.yellow().to_string(),
        Some(CheckStatus::Passing) => glyph.green().to_string(),
        None => glyph.to_string(),
    }
}

fn terminal_error(err: &wayfind_api::Error) -> CliError {
    if matches!(err, wayfind_api::Error::AclDisabled) {
        return CliError::AclDisabled;
    }
    match err.status() {
        Some(status @ (401 | 403)) => CliError::PermissionDenied { status },
        Some(status) => CliError::ApiError {
            status,
            message: err.to_string(),
        },
        None => CliError::ApiError {
            status: 0,
            message: err.to_string(),
        },
    }
}
