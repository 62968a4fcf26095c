//! Debug command handlers.

use super::{setup_interrupt_handler, CommandResult};
use anyhow::{bail, Context};
use ds3900_transport::{set_device_address, smbus, Channel};
use pmbus_fan::registers::{PAGE, PAGE_COUNT};
use std::sync::atomic::{AtomicBool, Ordering};

/// Cycle the PMBus page register through every page, reading each write back.
/// Runs until a mismatch, an error, Ctrl-C, or `iterations` writes.
pub fn thrash_pages<C: Channel + ?Sized>(
    channel: &mut C,
    address: u8,
    iterations: Option<u64>,
) -> CommandResult {
    let running = setup_interrupt_handler();
    thrash_pages_until(channel, address, iterations, &running)
}

fn thrash_pages_until<C: Channel + ?Sized>(
    channel: &mut C,
    address: u8,
    iterations: Option<u64>,
    running: &AtomicBool,
) -> CommandResult {
    set_device_address(channel, address).context("Failed to set device address")?;

    let mut page = 0u8;
    let mut i = 0u64;
    while running.load(Ordering::SeqCst) && iterations.is_none_or(|n| i < n) {
        if i % 100 == 0 {
            println!("{i}");
        }

        smbus::write_byte(channel, PAGE, page).context("Failed to set page")?;
        let read = smbus::read_byte(channel, PAGE).context("Failed to get page")?;
        if read != page {
            bail!("Page mismatch found at iteration {i}: set {page}, read {read}");
        }

        page = (page + 1) % PAGE_COUNT;
        i += 1;
    }

    println!("{i} iterations, no mismatch");
    Ok(())
}
