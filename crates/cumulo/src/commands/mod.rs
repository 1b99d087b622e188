//! Command handlers, one module per resource group.

pub mod alarms;
pub mod config_cmd;
pub mod devices;
pub mod events;
pub mod groups;
pub mod measurements;
pub mod operations;
pub mod provision;
pub mod util;
pub mod watch;

use cumulo_core::Platform;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Route a parsed command to its handler. `Config`, `Completions`, and
/// `Watch` are handled in `main` before a platform exists.
pub async fn dispatch(
    cmd: Command,
    platform: &Platform,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Devices(args) => devices::handle(platform, args, global).await,
        Command::Groups(args) => groups::handle(platform, args, global).await,
        Command::Alarms(args) => alarms::handle(platform, args, global).await,
        Command::Events(args) => events::handle(platform, args, global).await,
        Command::Operations(args) => operations::handle(platform, args, global).await,
        Command::Measurements(args) => measurements::handle(platform, args, global).await,
        Command::Provision(args) => provision::handle(platform, args, global).await,
        Command::Config(_) | Command::Completions(_) | Command::Watch(_) => {
            unreachable!("handled before dispatch")
        }
    }
}
