//! Command dispatch: bridges CLI args -> inventory calls -> output formatting.

pub mod auth;
pub mod config_cmd;
pub mod records;
pub mod util;

use medstock_core::{Inventory, Resource};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// The resource a record command addresses.
pub fn resource_of(cmd: &Command) -> Option<Resource> {
    match cmd {
        Command::Accounts(_) => Some(Resource::Accounts),
        Command::Staff(_) => Some(Resource::Staff),
        Command::Items(_) => Some(Resource::Items),
        Command::Storages(_) => Some(Resource::Storages),
        Command::Categories(_) => Some(Resource::StorageCategories),
        Command::Lots(_) => Some(Resource::ItemLots),
        Command::LotRequests(_) => Some(Resource::LotStorageRequests),
        Command::CreateRequests(_) => Some(Resource::LotCreateRequests),
        Command::Auth(_) | Command::Config(_) | Command::Completions(_) => None,
    }
}

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    inventory: &Inventory,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let resource = resource_of(&cmd);
    match (cmd, resource) {
        (
            Command::Accounts(args)
            | Command::Staff(args)
            | Command::Items(args)
            | Command::Storages(args)
            | Command::Categories(args)
            | Command::Lots(args)
            | Command::LotRequests(args)
            | Command::CreateRequests(args),
            Some(resource),
        ) => records::handle(inventory, resource, args, global).await,
        // Auth, Config, and Completions are handled before dispatch
        _ => unreachable!(),
    }
}
