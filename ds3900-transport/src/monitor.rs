//! MonitorChannel middleware for watching adapter traffic
//!
//! Wraps any [`Channel`] and prints every request and response frame passing
//! through it. Bytes and errors are forwarded untouched.
//!
//! # Example
//!
//! ```ignore
//! use ds3900_transport::{HidrawChannel, MonitorChannel, MonitorConfig};
//!
//! let channel = HidrawChannel::open(Path::new("/dev/hidraw3"))?;
//! let mut monitored = MonitorChannel::wrap(channel, MonitorConfig::default());
//! // Now all frames will be printed to stderr
//! ```

use std::str::FromStr;

use crossterm::style::Stylize;

use crate::channel::Channel;
use crate::error::TransportError;
use crate::protocol::{opcode, status};

/// Frame filter for selective display
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FrameFilter {
    #[default]
    All,
    Requests,
    Responses,
    /// Only exchanges whose request opcode family matches
    Opcode(u8),
}

impl FromStr for FrameFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" | "" => Ok(Self::All),
            "requests" | "request" | "req" => Ok(Self::Requests),
            "responses" | "response" | "rsp" => Ok(Self::Responses),
            s if s.starts_with("op=") || s.starts_with("0x") => {
                let hex_str = s.strip_prefix("op=").unwrap_or(s);
                let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
                u8::from_str_radix(hex_str, 16)
                    .map(Self::Opcode)
                    .map_err(|e| format!("Invalid opcode: {}", e))
            }
            _ => Err(format!("Unknown filter: {}", s)),
        }
    }
}

/// Configuration for the MonitorChannel
#[derive(Debug, Clone, Default)]
pub struct MonitorConfig {
    /// Show raw hex dump alongside decoded output
    pub show_hex: bool,
    /// Filter for selective display
    pub filter: FrameFilter,
}

impl MonitorConfig {
    pub fn with_hex(mut self, show: bool) -> Self {
        self.show_hex = show;
        self
    }

    pub fn with_filter(mut self, filter: FrameFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Channel middleware that prints all frames
pub struct MonitorChannel<C> {
    inner: C,
    config: MonitorConfig,
    last_opcode: Option<u8>,
}

impl<C: Channel> MonitorChannel<C> {
    pub fn wrap(inner: C, config: MonitorConfig) -> Self {
        Self {
            inner,
            config,
            last_opcode: None,
        }
    }

    pub fn into_inner(self) -> C {
        self.inner
    }

    fn opcode_matches(&self, op: Option<u8>) -> bool {
        match (&self.config.filter, op) {
            (FrameFilter::Opcode(want), Some(op)) => {
                *want == op || (*want & opcode::FAMILY_MASK == *want && op & opcode::FAMILY_MASK == *want)
            }
            (FrameFilter::Opcode(_), None) => false,
            _ => true,
        }
    }

    fn should_show_request(&self, op: Option<u8>) -> bool {
        !matches!(self.config.filter, FrameFilter::Responses) && self.opcode_matches(op)
    }

    fn should_show_response(&self) -> bool {
        !matches!(self.config.filter, FrameFilter::Requests) && self.opcode_matches(self.last_opcode)
    }

    fn hex(bytes: &[u8]) -> String {
        bytes
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One-line description of a request frame
pub fn describe_request(frame: &[u8]) -> String {
    match frame {
        [_, op, data, payload @ ..] if payload.is_empty() => {
            format!("{} (0x{op:02X}) data=0x{data:02X}", opcode::name(*op))
        }
        [_, op, data, payload @ ..] => format!(
            "{} (0x{op:02X}) data=0x{data:02X} payload={:02X?}",
            opcode::name(*op),
            payload
        ),
        _ => format!("malformed request {frame:02X?}"),
    }
}

/// One-line description of a response frame
pub fn describe_response(frame: &[u8]) -> String {
    match frame.split_last() {
        Some((trailer, [])) => format!("{} (0x{trailer:02X})", status::name(*trailer)),
        Some((trailer, data)) => format!(
            "{} (0x{trailer:02X}) data={data:02X?}",
            status::name(*trailer)
        ),
        None => "empty response".to_string(),
    }
}

impl<C: Channel> Channel for MonitorChannel<C> {
    fn write(&mut self, frame: &[u8]) -> Result<usize, TransportError> {
        let op = frame.get(1).copied();
        self.last_opcode = op;
        if self.should_show_request(op) {
            eprint!("{} {}", "→".green(), describe_request(frame));
            if self.config.show_hex {
                eprint!("  [{}]", Self::hex(frame).dark_grey());
            }
            eprintln!();
        }
        let result = self.inner.write(frame);
        if let Err(ref e) = result {
            eprintln!("{} write failed: {}", "✗".red(), e);
        }
        result
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let result = self.inner.read(buf);
        match result {
            Ok(n) if self.should_show_response() => {
                let frame = &buf[..n];
                let line = describe_response(frame);
                let styled = match frame.last() {
                    Some(&crate::protocol::RSP_BAD) => line.red(),
                    _ => line.cyan(),
                };
                eprint!("{} {}", "←".blue(), styled);
                if self.config.show_hex {
                    eprint!("  [{}]", Self::hex(frame).dark_grey());
                }
                eprintln!();
            }
            Ok(_) => {}
            Err(ref e) => eprintln!("{} read failed: {}", "✗".red(), e),
        }
        result
    }
}
