//! `petcare watch`: background polling until Ctrl-C.

use std::time::Duration;

use chrono::Local;
use petcare_core::Petcare;
use tokio::time::MissedTickBehavior;

use crate::cli::{GlobalOpts, WatchArgs};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    petcare: &Petcare,
    args: WatchArgs,
    global: &GlobalOpts,
    default_interval: u64,
) -> Result<(), CliError> {
    let secs = args.interval.unwrap_or(default_interval);
    if secs == 0 {
        return Err(CliError::Validation {
            field: "interval".into(),
            reason: "must be at least 1 second".into(),
        });
    }
    let period = Duration::from_secs(secs);

    petcare.refresh_device_data(false).await?;
    petcare.spawn_polling(period).await;

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => print_summary(petcare, global),
        }
    }

    petcare.shutdown().await;
    Ok(())
}

fn print_summary(petcare: &Petcare, global: &GlobalOpts) {
    let mut lines = vec![format!("── {} ──", Local::now().format("%H:%M:%S"))];
    for flap in petcare.flaps().iter() {
        lines.push(format!("{:<20} {}", flap.name, flap.lock));
    }
    for pet in petcare.pets().iter() {
        lines.push(format!("{:<20} {}", pet.name, pet.location));
    }
    output::print_output(&lines.join("\n"), global.quiet);
}
