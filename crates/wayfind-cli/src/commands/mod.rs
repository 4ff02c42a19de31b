//! Command dispatch: bridges CLI args -> core repositories -> output
//! formatting.

pub mod acl;
pub mod catalog;
pub mod config_cmd;
pub mod health;
pub mod intention;
pub mod kv;
pub mod session;
pub mod util;
pub mod watch;

use wayfind_core::Console;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an agent-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    console: &Console,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Catalog(args) => catalog::handle(console, args, global).await,
        Command::Health(args) => health::handle(console, args, global).await,
        Command::Kv(args) => kv::handle(console, args, global).await,
        Command::Acl(args) => acl::handle(console, args, global).await,
        Command::Intention(args) => intention::handle(console, args, global).await,
        Command::Session(args) => session::handle(console, args, global).await,
        Command::Watch(args) => watch::handle(console, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
