//! Command handlers for the CLI application.
//!
//! This module organizes command handlers by category:
//! - `adapter`: Adapter-level commands (revision, device)
//! - `register`: Raw register access (get, set)
//! - `fan`: Fan speed commands (fan speed get/set)
//! - `debug`: Stress tests (thrash-pages)

pub mod adapter;
pub mod debug;
pub mod fan;
pub mod register;

use anyhow::Context;
use ds3900_transport::{
    BoxedChannel, FrameFilter, HidChannel, HidrawChannel, MonitorChannel, MonitorConfig,
};
use max31785k::{Backend, Config};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Result type for command handlers
pub type CommandResult = anyhow::Result<()>;

/// Open the configured adapter.
/// If `monitor_config` is Some, the channel is wrapped with a monitor that prints every frame.
pub fn open_channel(
    config: &Config,
    monitor_config: Option<MonitorConfig>,
) -> anyhow::Result<BoxedChannel> {
    let path = config.device_path()?;
    debug!("Opening {} with {:?} backend", path.display(), config.backend);

    let channel: BoxedChannel = match config.backend {
        Backend::Hidapi => Box::new(
            HidChannel::open(path, config.read_timeout())
                .with_context(|| format!("opening {}", path.display()))?,
        ),
        Backend::Hidraw => {
            if config.timeout_ms.is_some() {
                warn!("Read timeout is only supported by the hidapi backend; ignoring");
            }
            Box::new(
                HidrawChannel::open(path).with_context(|| format!("opening {}", path.display()))?,
            )
        }
    };

    Ok(match monitor_config {
        Some(cfg) => Box::new(MonitorChannel::wrap(channel, cfg)),
        None => channel,
    })
}

/// Set up a Ctrl-C handler that sets the given flag to false when triggered.
/// Returns the Arc<AtomicBool> for use in the main loop.
pub fn setup_interrupt_handler() -> Arc<AtomicBool> {
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })
    .ok();

    running
}

/// Create monitor config from CLI flags
pub fn create_monitor_config(
    monitor: bool,
    hex: bool,
    filter: Option<&str>,
) -> anyhow::Result<Option<MonitorConfig>> {
    if !monitor {
        return Ok(None);
    }

    let filter = match filter {
        Some(f) => f.parse::<FrameFilter>().map_err(anyhow::Error::msg)?,
        None => FrameFilter::All,
    };

    Ok(Some(
        MonitorConfig::default().with_hex(hex).with_filter(filter),
    ))
}
