//! Catalog command handlers: datacenters, nodes, services.

use tabled::Tabled;

use wayfind_core::Console;
use wayfind_core::model::{Node, ServiceInstance, ServiceSummary};

use crate::cli::{CatalogArgs, CatalogCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    console: &Console,
    args: CatalogArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CatalogCommand::Datacenters => {
            let datacenters = console.datacenters().find_all().await?;
            let out = output::render_list(
                &global.output,
                &datacenters,
                |dc| DatacenterRow {
                    name: dc.name.clone(),
                },
                |dc| dc.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CatalogCommand::Nodes => {
            let nodes = console.nodes().find_all().await?;
            let out = output::render_list(
                &global.output,
                &nodes,
                |node| node_row(node.as_ref()),
                |node| node.key.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CatalogCommand::Node { name } => {
            let node = console.nodes().find_by_name(&name).await?;
            let out = output::render_single(
                &global.output,
                &node,
                |n| node_detail(n.as_ref()),
                |n| n.key.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CatalogCommand::Services => {
            let services = console.services().find_all().await?;
            let out = output::render_list(
                &global.output,
                &services,
                |svc| service_row(svc.as_ref()),
                |svc| svc.key.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CatalogCommand::Service { name, passing } => {
            let instances = console.services().instances(&name, passing).await?;
            let out = output::render_list(
                &global.output,
                &instances,
                instance_row,
                |inst| inst.key.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

// ── Rows ────────────────────────────────────────────────────────────

#[derive(Tabled)]
struct DatacenterRow {
    #[tabled(rename = "NAME")]
    name: String,
}

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "NODE")]
    name: String,
    #[tabled(rename = "ADDRESS")]
    address: String,
    #[tabled(rename = "DC")]
    datacenter: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "SERVICES")]
    services: usize,
    #[tabled(rename = "CHECKS")]
    checks: usize,
}

fn node_row(node: &Node) -> NodeRow {
    NodeRow {
        name: node.key.name.clone(),
        address: node.address.clone(),
        datacenter: node.key.datacenter.clone(),
        status: node.status().to_string(),
        services: node.services.len(),
        checks: node.checks.len(),
    }
}

#[derive(Tabled)]
struct ServiceRow {
    #[tabled(rename = "SERVICE")]
    name: String,
    #[tabled(rename = "DC")]
    datacenter: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "INSTANCES")]
    instances: u32,
    #[tabled(rename = "PASS")]
    passing: u32,
    #[tabled(rename = "WARN")]
    warning: u32,
    #[tabled(rename = "CRIT")]
    critical: u32,
    #[tabled(rename = "TAGS")]
    tags: String,
}

fn service_row(svc: &ServiceSummary) -> ServiceRow {
    ServiceRow {
        name: svc.key.name.clone(),
        datacenter: svc.key.datacenter.clone(),
        status: svc.status().to_string(),
        instances: svc.instance_count,
        passing: svc.checks_passing,
        warning: svc.checks_warning,
        critical: svc.checks_critical,
        tags: svc.tags.join(","),
    }
}

#[derive(Tabled)]
struct InstanceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NODE")]
    node: String,
    #[tabled(rename = "ADDRESS")]
    address: String,
    #[tabled(rename = "PORT")]
    port: u16,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "TAGS")]
    tags: String,
}

fn instance_row(inst: &ServiceInstance) -> InstanceRow {
    InstanceRow {
        id: inst.service_id.clone(),
        node: inst.node.clone(),
        address: inst.address.clone(),
        port: inst.port,
        status: inst.status().to_string(),
        tags: inst.tags.join(","),
    }
}

// ── Detail views ────────────────────────────────────────────────────

fn node_detail(node: &Node) -> String {
    let mut out = String::new();
    out.push_str(&format!("Node:       {}\n", node.key.name));
    out.push_str(&format!("Address:    {}\n", node.address));
    out.push_str(&format!("Datacenter: {}\n", node.key.datacenter));
    out.push_str(&format!("Status:     {}\n", node.status()));
    if !node.meta.is_empty() {
        out.push_str("Meta:\n");
        let mut meta: Vec<_> = node.meta.iter().collect();
        meta.sort();
        for (k, v) in meta {
            out.push_str(&format!("  {k}={v}\n"));
        }
    }
    if !node.services.is_empty() {
        out.push_str("Services:\n");
        for svc in &node.services {
            out.push_str(&format!("  {} (:{})\n", svc.name, svc.port));
        }
    }
    if !node.checks.is_empty() {
        out.push_str("Checks:\n");
        for check in &node.checks {
            out.push_str(&format!("  [{}] {}\n", check.status, check.name));
        }
    }
    out.trim_end().to_string()
}
