//! ACL command handlers: tokens, policies, roles.

use tabled::Tabled;

use wayfind_core::Console;
use wayfind_core::model::{LinkRef, Policy, ResourceKey, Role, Token};

use crate::cli::{
    AclArgs, AclCommand, GlobalOpts, PoliciesArgs, PoliciesCommand, RolesArgs, RolesCommand,
    TokensArgs, TokensCommand,
};
use crate::error::CliError;
use crate::output;

use super::util;

pub async fn handle(console: &Console, args: AclArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        AclCommand::Tokens(args) => handle_tokens(console, args, global).await,
        AclCommand::Policies(args) => handle_policies(console, args, global).await,
        AclCommand::Roles(args) => handle_roles(console, args, global).await,
    }
}

// ── Tokens ──────────────────────────────────────────────────────────

async fn handle_tokens(
    console: &Console,
    args: TokensArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        TokensCommand::List => {
            let tokens = console.tokens().find_all().await?;
            let out = output::render_list(
                &global.output,
                &tokens,
                |t| token_row(t.as_ref()),
                |t| t.accessor.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TokensCommand::Read { accessor } => {
            let accessor = util::parse_uuid("accessor", &accessor)?;
            let token = console.tokens().find(&accessor).await?;
            let out = output::render_single(&global.output, &token, token_detail, |t| {
                t.accessor.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TokensCommand::Create {
            description,
            policies,
            roles,
            local,
        } => {
            let token = Token {
                key: ResourceKey::named(console.datacenter(), ""),
                accessor: uuid::Uuid::nil(),
                secret: None,
                description,
                policies: named_links(policies),
                roles: named_links(roles),
                local,
                created: None,
                modify_index: 0,
            };
            let created = console.tokens().create(&token).await?;
            let out = output::render_single(&global.output, &created, token_detail, |t| {
                t.accessor.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TokensCommand::Delete { accessor } => {
            let accessor = util::parse_uuid("accessor", &accessor)?;
            if !util::confirm(&format!("Delete token '{accessor}'?"), global.yes)? {
                return Ok(());
            }
            let fingerprint =
                ResourceKey::named(console.datacenter(), accessor.to_string()).fingerprint();
            console.tokens().remove(&accessor, &fingerprint).await?;
            if !global.quiet {
                eprintln!("Token deleted");
            }
            Ok(())
        }

        TokensCommand::Clone { accessor } => {
            let accessor = util::parse_uuid("accessor", &accessor)?;
            let cloned = console.tokens().duplicate(&accessor).await?;
            let out = output::render_single(&global.output, &cloned, token_detail, |t| {
                t.accessor.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[derive(Tabled)]
struct TokenRow {
    #[tabled(rename = "ACCESSOR")]
    accessor: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "LOCAL")]
    local: bool,
    #[tabled(rename = "POLICIES")]
    policies: String,
    #[tabled(rename = "CREATED")]
    created: String,
}

fn token_row(token: &Token) -> TokenRow {
    TokenRow {
        accessor: token.accessor.to_string(),
        description: token.description.clone(),
        local: token.local,
        policies: link_names(&token.policies),
        created: token
            .created
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default(),
    }
}

fn token_detail(token: &Token) -> String {
    let mut out = String::new();
    out.push_str(&format!("AccessorID:  {}\n", token.accessor));
    if let Some(secret) = token.secret {
        out.push_str(&format!("SecretID:    {secret}\n"));
    }
    out.push_str(&format!("Description: {}\n", token.description));
    out.push_str(&format!("Local:       {}\n", token.local));
    if let Some(created) = token.created {
        out.push_str(&format!("Created:     {created}\n"));
    }
    if !token.policies.is_empty() {
        out.push_str(&format!("Policies:    {}\n", link_names(&token.policies)));
    }
    if !token.roles.is_empty() {
        out.push_str(&format!("Roles:       {}\n", link_names(&token.roles)));
    }
    out.trim_end().to_string()
}

// ── Policies ────────────────────────────────────────────────────────

async fn handle_policies(
    console: &Console,
    args: PoliciesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PoliciesCommand::List => {
            let policies = console.policies().find_all().await?;
            let out = output::render_list(
                &global.output,
                &policies,
                |p| policy_row(p.as_ref()),
                |p| p.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PoliciesCommand::Read { id } => {
            let id = util::parse_uuid("id", &id)?;
            let policy = console.policies().find(&id).await?;
            let out =
                output::render_single(&global.output, &policy, policy_detail, |p| p.name.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PoliciesCommand::Create {
            name,
            description,
            rules,
            file,
        } => {
            let rules = String::from_utf8(util::read_value(rules, file.as_ref())?).map_err(
                |_| CliError::Validation {
                    field: "rules".into(),
                    reason: "rule document is not valid UTF-8".into(),
                },
            )?;
            let policy = Policy {
                key: ResourceKey::named(console.datacenter(), name.clone()),
                id: None,
                name,
                description,
                rules,
                datacenters: Vec::new(),
                modify_index: 0,
            };
            let created = console.policies().create(&policy).await?;
            let out =
                output::render_single(&global.output, &created, policy_detail, |p| p.name.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PoliciesCommand::Delete { id } => {
            let id = util::parse_uuid("id", &id)?;
            if !util::confirm(&format!("Delete policy '{id}'?"), global.yes)? {
                return Ok(());
            }
            // Read first so the store entry (keyed by name) can be dropped.
            let policy = console.policies().find(&id).await?;
            console
                .policies()
                .remove(&id, &policy.key.fingerprint())
                .await?;
            if !global.quiet {
                eprintln!("Policy '{}' deleted", policy.name);
            }
            Ok(())
        }
    }
}

#[derive(Tabled)]
struct PolicyRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "DATACENTERS")]
    datacenters: String,
}

fn policy_row(policy: &Policy) -> PolicyRow {
    PolicyRow {
        name: policy.name.clone(),
        id: policy.id.map(|id| id.to_string()).unwrap_or_default(),
        description: policy.description.clone(),
        datacenters: if policy.datacenters.is_empty() {
            "(all)".into()
        } else {
            policy.datacenters.join(",")
        },
    }
}

fn policy_detail(policy: &Policy) -> String {
    let mut out = String::new();
    out.push_str(&format!("Name:        {}\n", policy.name));
    if let Some(id) = policy.id {
        out.push_str(&format!("ID:          {id}\n"));
    }
    out.push_str(&format!("Description: {}\n", policy.description));
    if !policy.datacenters.is_empty() {
        out.push_str(&format!("Datacenters: {}\n", policy.datacenters.join(",")));
    }
    out.push_str(&format!("Rules:\n{}\n", policy.rules));
    out.trim_end().to_string()
}

// ── Roles ───────────────────────────────────────────────────────────

async fn handle_roles(
    console: &Console,
    args: RolesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        RolesCommand::List => {
            let roles = console.roles().find_all().await?;
            let out = output::render_list(
                &global.output,
                &roles,
                |r| role_row(r.as_ref()),
                |r| r.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RolesCommand::Read { id } => {
            let id = util::parse_uuid("id", &id)?;
            let role = console.roles().find(&id).await?;
            let out = output::render_single(&global.output, &role, role_detail, |r| r.name.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RolesCommand::Create {
            name,
            description,
            policies,
        } => {
            let role = Role {
                key: ResourceKey::named(console.datacenter(), name.clone()),
                id: None,
                name,
                description,
                policies: named_links(policies),
                modify_index: 0,
            };
            let created = console.roles().create(&role).await?;
            let out =
                output::render_single(&global.output, &created, role_detail, |r| r.name.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RolesCommand::Delete { id } => {
            let id = util::parse_uuid("id", &id)?;
            if !util::confirm(&format!("Delete role '{id}'?"), global.yes)? {
                return Ok(());
            }
            let role = console.roles().find(&id).await?;
            console.roles().remove(&id, &role.key.fingerprint()).await?;
            if !global.quiet {
                eprintln!("Role '{}' deleted", role.name);
            }
            Ok(())
        }
    }
}

#[derive(Tabled)]
struct RoleRow {
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "DESCRIPTION")]
    description: String,
    #[tabled(rename = "POLICIES")]
    policies: String,
}

fn role_row(role: &Role) -> RoleRow {
    RoleRow {
        name: role.name.clone(),
        id: role.id.map(|id| id.to_string()).unwrap_or_default(),
        description: role.description.clone(),
        policies: link_names(&role.policies),
    }
}

fn role_detail(role: &Role) -> String {
    let mut out = String::new();
    out.push_str(&format!("Name:        {}\n", role.name));
    if let Some(id) = role.id {
        out.push_str(&format!("ID:          {id}\n"));
    }
    out.push_str(&format!("Description: {}\n", role.description));
    if !role.policies.is_empty() {
        out.push_str(&format!("Policies:    {}\n", link_names(&role.policies)));
    }
    out.trim_end().to_string()
}

// ── Shared ──────────────────────────────────────────────────────────

fn named_links(names: Option<Vec<String>>) -> Vec<LinkRef> {
    names
        .unwrap_or_default()
        .into_iter()
        .map(|name| LinkRef {
            id: None,
            name: Some(name),
        })
        .collect()
}

fn link_names(links: &[LinkRef]) -> String {
    links
        .iter()
        .filter_map(|l| l.name.as_deref().or(l.id.as_deref()))
        .collect::<Vec<_>>()
        .join(",")
}
