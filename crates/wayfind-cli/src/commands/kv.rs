//! Key/value command handlers.

use std::io::Write;

use tabled::Tabled;

use wayfind_core::Console;
use wayfind_core::model::KvEntry;

use crate::cli::{GlobalOpts, KvArgs, KvCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(console: &Console, args: KvArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        KvCommand::Get { path, raw } => {
            let entry = console.kv().get(&path).await?;
            if raw {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&entry.value)?;
                return Ok(());
            }
            let out = output::render_single(&global.output, &entry, entry_detail, |e| {
                e.path.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        KvCommand::Put {
            path,
            value,
            file,
            flags,
        } => {
            let bytes = util::read_value(value, file.as_ref())?;
            let applied = console.kv().put(&path, bytes, flags).await?;
            if !applied {
                return Err(CliError::EchoMismatch {
                    expected: path,
                    got: "a newer version (write lost a check-and-set race)".into(),
                });
            }
            if !global.quiet {
                eprintln!("Written: {path}");
            }
            Ok(())
        }

        KvCommand::Delete { path, recurse } => {
            let prompt = if recurse {
                format!("Delete everything under '{path}'? This is destructive.")
            } else {
                format!("Delete key '{path}'?")
            };
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }
            console.kv().delete(&path, recurse).await?;
            if !global.quiet {
                eprintln!("Deleted: {path}");
            }
            Ok(())
        }

        KvCommand::List { prefix } => {
            let entries = console.kv().list(&prefix).await?;
            let out = output::render_list(&global.output, &entries, entry_row, |e| {
                e.path.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        KvCommand::Keys { prefix, separator } => {
            let keys = console.kv().keys(&prefix, separator.as_deref()).await?;
            output::print_output(&keys.join("\n"), global.quiet);
            Ok(())
        }
    }
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "KEY")]
    path: String,
    #[tabled(rename = "SIZE")]
    size: usize,
    #[tabled(rename = "FLAGS")]
    flags: u64,
    #[tabled(rename = "INDEX")]
    modify_index: u64,
    #[tabled(rename = "LOCKED")]
    locked: String,
}

fn entry_row(entry: &KvEntry) -> EntryRow {
    EntryRow {
        path: entry.path.clone(),
        size: entry.value.len(),
        flags: entry.flags,
        modify_index: entry.modify_index,
        locked: if entry.session.is_some() { "yes" } else { "" }.into(),
    }
}

fn entry_detail(entry: &KvEntry) -> String {
    let mut out = String::new();
    out.push_str(&format!("Key:          {}\n", entry.path));
    out.push_str(&format!("Flags:        {}\n", entry.flags));
    out.push_str(&format!("CreateIndex:  {}\n", entry.create_index));
    out.push_str(&format!("ModifyIndex:  {}\n", entry.modify_index));
    if let Some(ref session) = entry.session {
        out.push_str(&format!("Session:      {session}\n"));
    }
    match entry.value_str() {
        Some(text) => out.push_str(&format!("Value:\n{text}\n")),
        None => out.push_str(&format!("Value:        <{} binary bytes>\n", entry.value.len())),
    }
    out.trim_end().to_string()
}
