//! Raw register access handlers (get, set).

use super::CommandResult;
use anyhow::bail;
use ds3900_transport::{set_device_address, smbus, Channel};
use max31785k::{format, Width};

/// Read `reg` from target `dev` and print it
pub fn get<C: Channel + ?Sized>(channel: &mut C, dev: u8, reg: u8, width: Width) -> CommandResult {
    match width {
        Width::Byte => {
            set_device_address(channel, dev)?;
            let value = smbus::read_byte(channel, reg)?;
            println!("{}", format::byte_line(reg, value));
        }
        Width::Word => {
            set_device_address(channel, dev)?;
            let value = smbus::read_word(channel, reg)?;
            println!("{}", format::word_line(reg, value));
        }
        Width::Block => {
            // Block reads address the target on the bus directly
            let data = smbus::read_block(channel, dev, reg)?;
            for line in format::block_dump(&data) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

/// Write `val` to `reg` on target `dev`
pub fn set<C: Channel + ?Sized>(
    channel: &mut C,
    dev: u8,
    reg: u8,
    val: u64,
    width: Width,
) -> CommandResult {
    match width {
        Width::Byte => {
            let Ok(value) = u8::try_from(val) else {
                bail!("value 0x{val:x} does not fit in a byte");
            };
            set_device_address(channel, dev)?;
            smbus::write_byte(channel, reg, value)?;
        }
        Width::Word => {
            let Ok(value) = u16::try_from(val) else {
                bail!("value 0x{val:x} does not fit in a word");
            };
            set_device_address(channel, dev)?;
            smbus::write_word(channel, reg, value)?;
        }
        Width::Block => bail!("block writes are not supported"),
    }
    Ok(())
}
