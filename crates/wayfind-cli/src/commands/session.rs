//! Session command handlers.

use tabled::Tabled;

use wayfind_core::Console;
use wayfind_core::model::Session;

use crate::cli::{GlobalOpts, SessionArgs, SessionCommand};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(
    console: &Console,
    args: SessionArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        SessionCommand::List { node } => {
            let sessions = console.sessions().for_node(&node).await?;
            let out =
                output::render_list(&global.output, &sessions, session_row, |s| s.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SessionCommand::Info { id } => {
            let session = console.sessions().info(&id).await?;
            let out =
                output::render_single(&global.output, &session, session_detail, |s| s.id.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        SessionCommand::Destroy { id } => {
            if !util::confirm(
                &format!("Destroy session '{id}'? Its locks will be released."),
                global.yes,
            )? {
                return Ok(());
            }
            console.sessions().destroy(&id).await?;
            if !global.quiet {
                eprintln!("Session destroyed");
            }
            Ok(())
        }
    }
}

#[derive(Tabled)]
struct SessionRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "NODE")]
    node: String,
    #[tabled(rename = "BEHAVIOR")]
    behavior: String,
    #[tabled(rename = "TTL")]
    ttl: String,
}

fn session_row(session: &Session) -> SessionRow {
    SessionRow {
        id: session.id.clone(),
        name: session.name.clone(),
        node: session.node.clone(),
        behavior: session.behavior.to_string(),
        ttl: session.ttl.clone(),
    }
}

fn session_detail(session: &Session) -> String {
    let mut out = String::new();
    out.push_str(&format!("ID:        {}\n", session.id));
    if !session.name.is_empty() {
        out.push_str(&format!("Name:      {}\n", session.name));
    }
    out.push_str(&format!("Node:      {}\n", session.node));
    out.push_str(&format!("Behavior:  {}\n", session.behavior));
    if !session.ttl.is_empty() {
        out.push_str(&format!("TTL:       {}\n", session.ttl));
    }
    if !session.checks.is_empty() {
        out.push_str(&format!("Checks:    {}\n", session.checks.join(",")));
    }
    out.trim_end().to_string()
}
