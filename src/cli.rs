// CLI definitions using clap

use clap::{Parser, Subcommand};
use max31785k::args::{parse_address, parse_number, parse_u8};
use max31785k::{Backend, FanRate, Width};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "max31785k")]
#[command(author, version, about = "MAX31785 fan controller access through a DS3900 adapter")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Adapter hidraw node (e.g. /dev/hidraw3)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub device: Option<PathBuf>,

    /// How to drive the hidraw node
    #[arg(long, global = true, value_enum)]
    pub backend: Option<Backend>,

    /// Read timeout in milliseconds (hidapi backend only; default blocks)
    #[arg(long, global = true, value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// PMBus target address for fan and page commands (default 0x52)
    #[arg(long, global = true, value_parser = parse_address)]
    pub address: Option<u8>,

    /// Enable transport monitoring (prints all frames)
    #[arg(long, global = true)]
    pub monitor: bool,

    /// Show raw hex dump alongside decoded output
    #[arg(long, global = true)]
    pub hex: bool,

    /// Filter monitor output (all, requests, responses, op=0xNN)
    #[arg(long, global = true)]
    pub filter: Option<String>,

    /// Config file path (default: ~/.config/max31785k/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the adapter firmware revision
    #[command(visible_alias = "rev")]
    Revision,

    /// Set the adapter's packet device address
    Device {
        /// 7-bit target address
        #[arg(value_parser = parse_address)]
        addr: u8,
    },

    /// Read a register (b = byte, w = word, s = SMBus block)
    Get {
        /// 7-bit target address
        #[arg(value_parser = parse_address)]
        dev: u8,
        /// Register (command code)
        #[arg(value_parser = parse_u8)]
        reg: u8,
        /// Access width
        #[arg(default_value = "b")]
        width: Width,
    },

    /// Write a register (b = byte, w = word)
    Set {
        /// 7-bit target address
        #[arg(value_parser = parse_address)]
        dev: u8,
        /// Register (command code)
        #[arg(value_parser = parse_u8)]
        reg: u8,
        /// Value to write
        #[arg(value_parser = parse_number)]
        val: u64,
        /// Access width
        #[arg(default_value = "b")]
        width: Width,
    },

    /// Fan control
    Fan {
        #[command(subcommand)]
        command: FanCommands,
    },

    /// Write and read back the PMBus page register in a loop
    ThrashPages {
        /// Stop after this many iterations (default: run until failure)
        #[arg(long)]
        iterations: Option<u64>,
    },
}

#[derive(Subcommand)]
pub enum FanCommands {
    /// Fan speed
    Speed {
        #[command(subcommand)]
        command: SpeedCommands,
    },
}

#[derive(Subcommand)]
pub enum SpeedCommands {
    /// Show commanded and measured speed
    Get {
        /// PMBus page
        #[arg(value_parser = parse_u8)]
        page: u8,
        /// Fan slot (1-4)
        #[arg(value_parser = parse_u8)]
        fan: u8,
    },

    /// Command a fan speed
    Set {
        /// PMBus page
        #[arg(value_parser = parse_u8)]
        page: u8,
        /// Fan slot (1-4)
        #[arg(value_parser = parse_u8)]
        fan: u8,
        /// Rate with unit, e.g. 2500rpm or 40%
        rate: FanRate,
    },
}
