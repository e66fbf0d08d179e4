//! Command dispatch: bridges CLI args to `Petcare` calls and output.

pub mod config_cmd;
pub mod entities;
pub mod lock;
pub mod watch;

use petcare_core::Petcare;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a service-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    petcare: &Petcare,
    profile: &str,
    global: &GlobalOpts,
    default_interval: u64,
) -> Result<(), CliError> {
    if !petcare.login().await? {
        return Err(CliError::AuthFailed {
            profile: profile.into(),
        });
    }

    match cmd {
        Command::Hubs => entities::hubs(petcare, global).await,
        Command::Flaps => entities::flaps(petcare, global).await,
        Command::Pets => entities::pets(petcare, global).await,
        Command::Device(args) => entities::device(petcare, args, global).await,
        Command::PetDetails => entities::pet_details(petcare, global).await,
        Command::Lock(args) => lock::handle(petcare, args, global).await,
        Command::Watch(args) => watch::handle(petcare, args, global, default_interval).await,
        // Config is handled before dispatch
        Command::Config(_) => unreachable!(),
    }
}
