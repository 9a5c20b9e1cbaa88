//! Command dispatch: bridges CLI args -> core calls -> output formatting.
//!
//! Each handler runs its core calls inside `Controller::oneshot`, so the
//! session lives exactly as long as the command.

pub mod devices;
pub mod info;
pub mod set_state;

use switchbee_core::ControllerConfig;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a central-unit-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    config: ControllerConfig,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::GetStates(args) => devices::handle_states(config, &args, global).await,
        Command::GetDevices(args) => devices::handle_list(config, &args, global).await,
        Command::SetState(args) => set_state::handle(config, args, global).await,
        Command::Info => info::handle_info(config, global).await,
        Command::Stats => info::handle_stats(config, global).await,
        // Completions never reach dispatch
        Command::Completions(_) => Ok(()),
    }
}
