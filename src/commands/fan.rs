//! Fan speed command handlers.

use super::CommandResult;
use ds3900_transport::{set_device_address, Channel};
use max31785k::FanRate;
use pmbus_fan::{Fan, FanController, FanReading, SetOutcome};
use tracing::info;

/// Print commanded and measured speed of one fan
pub fn speed_get<C: Channel + ?Sized>(
    channel: &mut C,
    address: u8,
    page: u8,
    fan: u8,
) -> CommandResult {
    let fan = Fan::try_from(fan)?;
    set_device_address(channel, address)?;

    let mut controller = FanController::new(channel, page);
    let reading = controller.reading(fan)?;
    match reading {
        FanReading::Disabled => eprintln!("{}", reading.describe(page, fan)),
        _ => println!("{}", reading.describe(page, fan)),
    }
    Ok(())
}

/// Switch a fan to the rate's mode and command it
pub fn speed_set<C: Channel + ?Sized>(
    channel: &mut C,
    address: u8,
    page: u8,
    fan: u8,
    rate: FanRate,
) -> CommandResult {
    let fan = Fan::try_from(fan)?;
    set_device_address(channel, address)?;

    let mut controller = FanController::new(channel, page);
    match controller.set_rate(fan, rate.mode, rate.command)? {
        SetOutcome::Applied => {
            info!("Fan {page}:{fan} set to {} ({:?})", rate.command, rate.mode)
        }
        SetOutcome::Disabled => eprintln!("{}", FanReading::Disabled.describe(page, fan)),
    }
    Ok(())
}
