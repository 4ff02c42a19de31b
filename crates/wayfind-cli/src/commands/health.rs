//! Health command handlers.

use tabled::Tabled;

use wayfind_core::Console;
use wayfind_core::model::HealthCheck;

use crate::cli::{GlobalOpts, HealthArgs, HealthCommand};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    console: &Console,
    args: HealthArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let checks = match args.command {
        HealthCommand::Service { name } => console.services().checks(&name).await?,
        HealthCommand::Node { name } => console.services().node_checks(&name).await?,
    };

    let out = output::render_list(&global.output, &checks, check_row, |c| c.id.clone());
    output::print_output(&out, global.quiet);
    Ok(())
}

#[derive(Tabled)]
struct CheckRow {
    #[tabled(rename = "CHECK")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "NODE")]
    node: String,
    #[tabled(rename = "SERVICE")]
    service: String,
    #[tabled(rename = "OUTPUT")]
    output: String,
}

fn check_row(check: &HealthCheck) -> CheckRow {
    CheckRow {
        id: check.id.clone(),
        name: check.name.clone(),
        status: check.status.to_string(),
        node: check.node.clone(),
        service: check.service_name.clone().unwrap_or_else(|| "-".into()),
        output: truncate(&check.output, 48),
    }
}

/// Trim long check output to keep table rows on one line.
fn truncate(s: &str, max: usize) -> String {
    let line = s.lines().next().unwrap_or_default();
    if line.chars().count() <= max {
        line.to_string()
    } else {
        let cut: String = line.chars().take(max).collect();
        format!("{cut}...")
    }
}
