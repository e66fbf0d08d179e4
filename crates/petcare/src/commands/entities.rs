//! Read-only listings of hubs, flaps and pets.

use petcare_core::Petcare;

use crate::cli::{DeviceArgs, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, FlapRow, HubRow, PetRow};

pub async fn hubs(petcare: &Petcare, global: &GlobalOpts) -> Result<(), CliError> {
    petcare.refresh_device_data(false).await?;
    let hubs = petcare.hubs();
    let out = output::render_list::<_, HubRow>(global.format(), &hubs, |h| h.id);
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn flaps(petcare: &Petcare, global: &GlobalOpts) -> Result<(), CliError> {
    petcare.refresh_device_data(false).await?;
    let flaps = petcare.flaps();
    let out = output::render_list::<_, FlapRow>(global.format(), &flaps, |f| f.id);
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn pets(petcare: &Petcare, global: &GlobalOpts) -> Result<(), CliError> {
    petcare.refresh_device_data(false).await?;
    let pets = petcare.pets();
    let out = output::render_list::<_, PetRow>(global.format(), &pets, |p| p.id);
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn device(
    petcare: &Petcare,
    args: DeviceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    petcare.refresh_device_data(false).await?;
    let device = petcare.device(args.id).ok_or_else(|| CliError::NotFound {
        identifier: args.id.to_string(),
    })?;
    output::print_output(&output::render_single(global.format(), &device), global.quiet);
    Ok(())
}

pub async fn pet_details(petcare: &Petcare, global: &GlobalOpts) -> Result<(), CliError> {
    let details = petcare
        .pet_details()
        .await?
        .ok_or_else(|| CliError::Unavailable {
            resource: "pet".into(),
        })?;
    output::print_output(&output::render_single(global.format(), &details), global.quiet);
    Ok(())
}
