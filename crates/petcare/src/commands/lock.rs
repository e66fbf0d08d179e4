//! `petcare lock <flap> <mode>`.

use petcare_core::Petcare;
use tracing::info;

use crate::cli::{GlobalOpts, LockArgs, OutputFormat};
use crate::error::CliError;
use crate::output;

pub async fn handle(petcare: &Petcare, args: LockArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // Load the snapshot first so unknown flap ids are rejected locally.
    petcare.refresh_device_data(false).await?;

    if !petcare.lock(args.flap_id, args.mode).await? {
        return Err(CliError::LockUnconfirmed {
            flap_id: args.flap_id,
            mode: args.mode.to_string(),
        });
    }
    info!(flap_id = args.flap_id, mode = %args.mode, "lock mode confirmed");

    if let Some(device) = petcare.device(args.flap_id) {
        let out = match global.format() {
            OutputFormat::Table | OutputFormat::Plain => {
                format!("{}: {}", device.name(), device.state())
            }
            structured => output::render_single(structured, &device),
        };
        output::print_output(&out, global.quiet);
    }
    Ok(())
}
