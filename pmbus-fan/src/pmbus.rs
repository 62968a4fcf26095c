//! Paged PMBus register access
//!
//! Every operation selects `page` by writing the PAGE register, then performs
//! the SMBus byte or word operation. The target must already be selected with
//! [`set_device_address`](ds3900_transport::set_device_address).

use ds3900_transport::{smbus, Channel};
use tracing::trace;

use crate::error::PmbusError;
use crate::registers::{self, PAGE};

fn select_page<C: Channel + ?Sized>(channel: &mut C, page: u8) -> Result<(), PmbusError> {
    smbus::write_byte(channel, PAGE, page)?;
    Ok(())
}

pub fn read_byte<C: Channel + ?Sized>(
    channel: &mut C,
    page: u8,
    register: u8,
) -> Result<u8, PmbusError> {
    select_page(channel, page)?;
    let value = smbus::read_byte(channel, register)?;
    trace!("{}[{page}] -> 0x{value:02X}", registers::name(register));
    Ok(value)
}

pub fn write_byte<C: Channel + ?Sized>(
    channel: &mut C,
    page: u8,
    register: u8,
    value: u8,
) -> Result<(), PmbusError> {
    select_page(channel, page)?;
    trace!("{}[{page}] <- 0x{value:02X}", registers::name(register));
    smbus::write_byte(channel, register, value)?;
    Ok(())
}

pub fn read_word<C: Channel + ?Sized>(
    channel: &mut C,
    page: u8,
    register: u8,
) -> Result<u16, PmbusError> {
    select_page(channel, page)?;
    let value = smbus::read_word(channel, register)?;
    trace!("{}[{page}] -> 0x{value:04X}", registers::name(register));
    Ok(value)
}

pub fn write_word<C: Channel + ?Sized>(
    channel: &mut C,
    page: u8,
    register: u8,
    value: u16,
) -> Result<(), PmbusError> {
    select_page(channel, page)?;
    trace!("{}[{page}] <- 0x{value:04X}", registers::name(register));
    smbus::write_word(channel, register, value)?;
    Ok(())
}
