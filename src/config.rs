//! Persistent tool configuration
//!
//! Stored as TOML, by default at `~/.config/max31785k/config.toml`. Every key
//! is optional and command-line options take precedence over the file.
//!
//! ```toml
//! device = "/dev/hidraw3"
//! backend = "hidraw"
//! address = 0x52
//! timeout_ms = 500
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::ValueEnum;
use pmbus_fan::MAX31785_ADDRESS;
use serde::{Deserialize, Serialize};

/// How the adapter's hidraw node is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// hidapi device opened by path
    #[default]
    Hidapi,
    /// Plain read/write on the hidraw character device
    Hidraw,
}

/// Tool configuration after file and command-line values are combined
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Adapter hidraw node
    pub device: Option<PathBuf>,
    pub backend: Backend,
    /// 7-bit PMBus target address
    pub address: u8,
    /// Read timeout in milliseconds (hidapi backend only)
    pub timeout_ms: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: None,
            backend: Backend::default(),
            address: MAX31785_ADDRESS,
            timeout_ms: None,
        }
    }
}

/// Values given on the command line; `None` keeps the file value
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub device: Option<PathBuf>,
    pub backend: Option<Backend>,
    pub address: Option<u8>,
    pub timeout_ms: Option<u64>,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("max31785k")
            .join("config.toml")
    }

    /// Load config from a file, or return default if not found
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parse TOML config text
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        if config.address > 0x7F {
            bail!("address 0x{:02x} is not a 7-bit address", config.address);
        }
        Ok(config)
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(device) = overrides.device {
            self.device = Some(device);
        }
        if let Some(backend) = overrides.backend {
            self.backend = backend;
        }
        if let Some(address) = overrides.address {
            self.address = address;
        }
        if let Some(timeout_ms) = overrides.timeout_ms {
            self.timeout_ms = Some(timeout_ms);
        }
        self
    }

    pub fn read_timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Device path, required by every command
    pub fn device_path(&self) -> anyhow::Result<&Path> {
        match &self.device {
            Some(path) => Ok(path.as_path()),
            None => bail!("no adapter given; pass --device or set `device` in the config file"),
        }
    }
}
