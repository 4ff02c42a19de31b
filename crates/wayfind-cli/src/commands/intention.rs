//! Intention command handlers.

use tabled::Tabled;

use wayfind_core::Console;
use wayfind_core::model::{Intention, IntentionAction, ResourceKey, ServiceName};

use crate::cli::{GlobalOpts, IntentionActionArg, IntentionArgs, IntentionCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    console: &Console,
    args: IntentionArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        IntentionCommand::List => {
            let intentions = console.intentions().find_all().await?;
            let out = output::render_list(
                &global.output,
                &intentions,
                |i| intention_row(i.as_ref()),
                |i| i.key.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        IntentionCommand::Get {
            source,
            destination,
        } => {
            let intention = console.intentions().find(&source, &destination).await?;
            let out = output::render_single(&global.output, &intention, intention_detail, |i| {
                i.key.name.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        IntentionCommand::Create {
            source,
            destination,
            action,
            description,
        } => {
            let intention = Intention {
                key: ResourceKey::named(
                    console.datacenter(),
                    format!("{source}->{destination}"),
                ),
                id: None,
                source: ServiceName::new(source),
                destination: ServiceName::new(destination),
                action: match action {
                    IntentionActionArg::Allow => IntentionAction::Allow,
                    IntentionActionArg::Deny => IntentionAction::Deny,
                },
                description,
                precedence: 0,
                modify_index: 0,
            };
            console.intentions().persist(&intention).await?;
            if !global.quiet {
                eprintln!(
                    "Intention {} -> {} set to {}",
                    intention.source.name, intention.destination.name, intention.action
                );
            }
            Ok(())
        }

        IntentionCommand::Delete {
            source,
            destination,
        } => {
            if !util::confirm(
                &format!("Delete intention '{source} -> {destination}'?"),
                global.yes,
            )? {
                return Ok(());
            }
            console.intentions().remove(&source, &destination).await?;
            if !global.quiet {
                eprintln!("Intention deleted");
            }
            Ok(())
        }
    }
}

#[derive(Tabled)]
struct IntentionRow {
    #[tabled(rename = "SOURCE")]
    source: String,
    #[tabled(rename = "DESTINATION")]
    destination: String,
    #[tabled(rename = "ACTION")]
    action: String,
    #[tabled(rename = "PRECEDENCE")]
    precedence: i64,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
}

fn intention_row(intention: &Intention) -> IntentionRow {
    IntentionRow {
        source: intention.source.name.clone(),
        destination: intention.destination.name.clone(),
        action: intention.action.to_string(),
        precedence: intention.precedence,
        description: intention.description.clone(),
    }
}

fn intention_detail(intention: &Intention) -> String {
    let mut out = String::new();
    out.push_str(&format!("Source:      {}\n", intention.source.name));
    out.push_str(&format!("Destination: {}\n", intention.destination.name));
    out.push_str(&format!("Action:      {}\n", intention.action));
    out.push_str(&format!("Precedence:  {}\n", intention.precedence));
    if let Some(ref id) = intention.id {
        out.push_str(&format!("ID:          {id}\n"));
    }
    if !intention.description.is_empty() {
        out.push_str(&format!("Description: {}\n", intention.description));
    }
    out.trim_end().to_string()
}
