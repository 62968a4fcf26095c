//! Adapter-level command handlers.

use super::CommandResult;
use ds3900_transport::{read_revision, set_device_address, Channel};

/// Print the adapter firmware revision
pub fn revision<C: Channel + ?Sized>(channel: &mut C) -> CommandResult {
    let rev = read_revision(channel)?;
    println!("DS3900 revision: {rev}");
    Ok(())
}

/// Select the target used by packet reads and writes
pub fn device<C: Channel + ?Sized>(channel: &mut C, address: u8) -> CommandResult {
    set_device_address(channel, address)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ds3900_transport::emulator::Ds3900Emulator;

    #[test]
    fn device_selects_target() {
        let mut emu = Ds3900Emulator::new(0x52).with_revision(2, 1);
        device(&mut emu, 0x52).unwrap();
        assert_eq!(emu.selected_address(), 0x52);
        revision(&mut emu).unwrap();
    }
}
