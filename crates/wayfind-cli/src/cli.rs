//! Clap derive structures for the `wayfind` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// wayfind -- terminal console for Consul-compatible agents
#[derive(Debug, Parser)]
#[command(
    name = "wayfind",
    version,
    about = "Browse and manage a service catalog from the command line",
    long_about = "A terminal console for Consul-compatible control planes.\n\n\
        Reads the catalog, health, KV store, ACLs, intentions, and sessions\n\
        over the agent's HTTP API, with live watches driven by blocking queries.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Agent profile to use
    #[arg(long, short = 'p', env = "WAYFIND_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Agent base URL (overrides profile)
    #[arg(long, short = 's', env = "WAYFIND_SERVER", global = true)]
    pub server: Option<String>,

    /// Target datacenter instead of the agent's own
    #[arg(long, short = 'd', env = "WAYFIND_DATACENTER", global = true)]
    pub datacenter: Option<String>,

    /// Namespace scope (enterprise agents)
    #[arg(long, env = "WAYFIND_NAMESPACE", global = true)]
    pub namespace: Option<String>,

    /// Admin partition scope (enterprise agents)
    #[arg(long, env = "WAYFIND_PARTITION", global = true)]
    pub partition: Option<String>,

    /// ACL token
    #[arg(long, env = "WAYFIND_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "WAYFIND_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "WAYFIND_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "WAYFIND_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Browse datacenters, nodes, and services
    #[command(alias = "cat")]
    Catalog(CatalogArgs),

    /// Query health checks
    Health(HealthArgs),

    /// Read and write the key/value store
    Kv(KvArgs),

    /// Manage ACL tokens, policies, and roles
    Acl(AclArgs),

    /// Manage service intentions
    #[command(alias = "int")]
    Intention(IntentionArgs),

    /// Inspect and destroy sessions
    Session(SessionArgs),

    /// Follow resources live via blocking queries
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CATALOG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommand,
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// List known datacenters
    #[command(alias = "dc")]
    Datacenters,

    /// List nodes with aggregated health
    Nodes,

    /// Get one node with its services and checks
    Node {
        /// Node name
        name: String,
    },

    /// List services with instance counts and check tallies
    #[command(alias = "svc")]
    Services,

    /// List instances of one service
    Service {
        /// Service name
        name: String,

        /// Only instances whose checks all pass
        #[arg(long)]
        passing: bool,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  HEALTH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct HealthArgs {
    #[command(subcommand)]
    pub command: HealthCommand,
}

#[derive(Debug, Subcommand)]
pub enum HealthCommand {
    /// Checks registered for one service across all nodes
    #[command(visible_alias = "checks")]
    Service {
        /// Service name
        name: String,
    },

    /// Checks registered on one node
    Node {
        /// Node name
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  KV
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct KvArgs {
    #[command(subcommand)]
    pub command: KvCommand,
}

#[derive(Debug, Subcommand)]
pub enum KvCommand {
    /// Read one key
    Get {
        /// Key path (e.g., "config/app/rate-limit")
        path: String,

        /// Print the raw value only, no metadata
        #[arg(long)]
        raw: bool,
    },

    /// Write a key
    Put {
        /// Key path
        path: String,

        /// Value to write (omit to read from --file or stdin)
        value: Option<String>,

        /// Read the value from a file ('-' for stdin)
        #[arg(long, short = 'F', conflicts_with = "value")]
        file: Option<PathBuf>,

        /// Opaque integer flags stored with the key
        #[arg(long)]
        flags: Option<u64>,
    },

    /// Delete a key, or a whole prefix with --recurse
    Delete {
        /// Key path
        path: String,

        /// Delete everything under the path
        #[arg(long, short = 'r')]
        recurse: bool,
    },

    /// Recursively list entries under a prefix
    #[command(alias = "ls")]
    List {
        /// Key prefix (empty for the whole store)
        #[arg(default_value = "")]
        prefix: String,
    },

    /// List key names under a prefix, folded at a separator
    Keys {
        /// Key prefix
        #[arg(default_value = "")]
        prefix: String,

        /// Fold keys at this separator (e.g., "/")
        #[arg(long)]
        separator: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ACL
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AclArgs {
    #[command(subcommand)]
    pub command: AclCommand,
}

#[derive(Debug, Subcommand)]
pub enum AclCommand {
    /// Manage ACL tokens
    Tokens(TokensArgs),

    /// Manage ACL policies
    Policies(PoliciesArgs),

    /// Manage ACL roles
    Roles(RolesArgs),
}

// --- Tokens ---

#[derive(Debug, Args)]
pub struct TokensArgs {
    #[command(subcommand)]
    pub command: TokensCommand,
}

#[derive(Debug, Subcommand)]
pub enum TokensCommand {
    /// List token stubs (no secrets)
    #[command(alias = "ls")]
    List,

    /// Read one token, secret included
    Read {
        /// Accessor ID (UUID)
        accessor: String,
    },

    /// Create a token
    Create {
        /// Description
        #[arg(long, default_value = "")]
        description: String,

        /// Policy names to link (comma-separated)
        #[arg(long, value_delimiter = ',')]
        policies: Option<Vec<String>>,

        /// Role names to link (comma-separated)
        #[arg(long, value_delimiter = ',')]
        roles: Option<Vec<String>>,

        /// Restrict the token to the local datacenter
        #[arg(long)]
        local: bool,
    },

    /// Delete a token
    Delete {
        /// Accessor ID (UUID)
        accessor: String,
    },

    /// Clone a token, yielding a fresh accessor/secret pair
    Clone {
        /// Accessor ID (UUID)
        accessor: String,
    },
}

// --- Policies ---

#[derive(Debug, Args)]
pub struct PoliciesArgs {
    #[command(subcommand)]
    pub command: PoliciesCommand,
}

#[derive(Debug, Subcommand)]
pub enum PoliciesCommand {
    /// List policies
    #[command(alias = "ls")]
    List,

    /// Read one policy
    Read {
        /// Policy ID (UUID)
        id: String,
    },

    /// Create a policy
    Create {
        /// Policy name
        #[arg(long, required = true)]
        name: String,

        /// Description
        #[arg(long, default_value = "")]
        description: String,

        /// HCL rules inline (omit to read from --file or stdin)
        #[arg(long)]
        rules: Option<String>,

        /// Read rules from a file ('-' for stdin)
        #[arg(long, short = 'F', conflicts_with = "rules")]
        file: Option<PathBuf>,
    },

    /// Delete a policy
    Delete {
        /// Policy ID (UUID)
        id: String,
    },
}

// --- Roles ---

#[derive(Debug, Args)]
pub struct RolesArgs {
    #[command(subcommand)]
    pub command: RolesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RolesCommand {
    /// List roles
    #[command(alias = "ls")]
    List,

    /// Read one role
    Read {
        /// Role ID (UUID)
        id: String,
    },

    /// Create a role
    Create {
        /// Role name
        #[arg(long, required = true)]
        name: String,

        /// Description
        #[arg(long, default_value = "")]
        description: String,

        /// Policy names to link (comma-separated)
        #[arg(long, value_delimiter = ',')]
        policies: Option<Vec<String>>,
    },

    /// Delete a role
    Delete {
        /// Role ID (UUID)
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  INTENTION
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct IntentionArgs {
    #[command(subcommand)]
    pub command: IntentionCommand,
}

#[derive(Debug, Subcommand)]
pub enum IntentionCommand {
    /// List intentions in precedence order
    #[command(alias = "ls")]
    List,

    /// Read one intention by source/destination pair
    Get {
        /// Source service
        source: String,

        /// Destination service
        destination: String,
    },

    /// Create or update an intention
    Create {
        /// Source service
        source: String,

        /// Destination service
        destination: String,

        /// Action for matching connections
        #[arg(long, default_value = "allow", value_enum)]
        action: IntentionActionArg,

        /// Description
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Delete an intention
    Delete {
        /// Source service
        source: String,

        /// Destination service
        destination: String,
    },
}

#[derive(Debug, Clone, ValueEnum)]
pub enum IntentionActionArg {
    Allow,
    Deny,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SESSION
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// List sessions held by one node
    #[command(alias = "ls")]
    List {
        /// Node name
        #[arg(long, required = true)]
        node: String,
    },

    /// Read one session by ID
    Info {
        /// Session ID (UUID)
        id: String,
    },

    /// Force-destroy a session, releasing its locks
    Destroy {
        /// Session ID (UUID)
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  WATCH
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct WatchArgs {
    #[command(subcommand)]
    pub command: WatchCommand,
}

#[derive(Debug, Subcommand)]
pub enum WatchCommand {
    /// Follow the node listing
    Nodes,

    /// Follow the service listing
    Services,

    /// Follow one service's instances
    Service {
        /// Service name
        name: String,
    },

    /// Follow a KV prefix
    Kv {
        /// Key prefix
        prefix: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a configuration value on the active profile
    Set {
        /// Config key (e.g., "server", "datacenter", "blocking")
        key: String,

        /// Value to set
        value: String,
    },

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store an ACL token in the system keyring
    SetToken {
        /// Profile name (default: active profile)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
