//! Argument parsing shared by the CLI commands
//!
//! Numbers follow C `strtoul(.., 0)` prefix rules: `0x`/`0X` for hex, a
//! leading `0` for octal, decimal otherwise. Unlike `strtoul`, a string with
//! no digits is an error rather than zero.

use std::str::FromStr;

use pmbus_fan::FanMode;
use thiserror::Error;

/// Errors from parsing CLI arguments
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseArgError {
    #[error("no digits in \"{0}\"")]
    NoDigits(String),

    #[error("trailing characters in \"{0}\"")]
    TrailingCharacters(String),

    #[error("{value} out of range for {what} (max {max})")]
    OutOfRange { what: &'static str, value: u64, max: u64 },

    #[error("unknown width \"{0}\" (expected b, w or s)")]
    UnknownWidth(String),

    #[error("fan rate \"{0}\" needs a unit suffix (rpm or %)")]
    MissingUnit(String),

    #[error("unknown fan rate unit \"{0}\" (expected rpm or %)")]
    UnknownUnit(String),
}

/// Parse a leading unsigned number, returning it and the unparsed rest
pub fn split_number(s: &str) -> Result<(u64, &str), ParseArgError> {
    let trimmed = s.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);

    let (radix, digits) = match unsigned.as_bytes() {
        [b'0', b'x' | b'X', next, ..] if next.is_ascii_hexdigit() => (16, &unsigned[2..]),
        [b'0', ..] => (8, unsigned),
        _ => (10, unsigned),
    };

    let end = digits
        .find(|c: char| !c.is_digit(radix))
        .unwrap_or(digits.len());
    if end == 0 {
        return Err(ParseArgError::NoDigits(s.to_string()));
    }

    let value = u64::from_str_radix(&digits[..end], radix).map_err(|_| ParseArgError::OutOfRange {
        what: "u64",
        value: u64::MAX,
        max: u64::MAX,
    })?;
    Ok((value, &digits[end..]))
}

/// Parse a whole string as an unsigned number
pub fn parse_number(s: &str) -> Result<u64, ParseArgError> {
    let (value, rest) = split_number(s)?;
    if !rest.is_empty() {
        return Err(ParseArgError::TrailingCharacters(s.to_string()));
    }
    Ok(value)
}

fn parse_bounded(s: &str, what: &'static str, max: u64) -> Result<u64, ParseArgError> {
    let value = parse_number(s)?;
    if value > max {
        return Err(ParseArgError::OutOfRange { what, value, max });
    }
    Ok(value)
}

/// 8-bit value (addresses, registers, pages)
pub fn parse_u8(s: &str) -> Result<u8, ParseArgError> {
    parse_bounded(s, "byte", u8::MAX.into()).map(|v| v as u8)
}

/// 7-bit SMBus target address
pub fn parse_address(s: &str) -> Result<u8, ParseArgError> {
    parse_bounded(s, "7-bit address", 0x7F).map(|v| v as u8)
}

/// Register access width for `get`/`set`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Width {
    #[default]
    Byte,
    Word,
    /// SMBus block read
    Block,
}

impl FromStr for Width {
    type Err = ParseArgError;

    /// Only the first character is significant, so `byte`/`word` also work
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.chars().next() {
            Some('b') => Ok(Width::Byte),
            Some('w') => Ok(Width::Word),
            Some('s') => Ok(Width::Block),
            _ => Err(ParseArgError::UnknownWidth(s.to_string())),
        }
    }
}

/// Fan rate with unit, e.g. `2500rpm` or `40%`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FanRate {
    pub mode: FanMode,
    /// Raw FAN_COMMAND value: RPM, or hundredths of a percent
    pub command: u16,
}

impl FromStr for FanRate {
    type Err = ParseArgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (value, unit) = split_number(s)?;
        let (mode, command) = if unit.is_empty() {
            return Err(ParseArgError::MissingUnit(s.to_string()));
        } else if unit.eq_ignore_ascii_case("rpm") {
            (FanMode::Rpm, value)
        } else if unit == "%" {
            (FanMode::Pwm, value.saturating_mul(100))
        } else {
            return Err(ParseArgError::UnknownUnit(unit.to_string()));
        };
        if command > u64::from(u16::MAX) {
            return Err(ParseArgError::OutOfRange {
                what: "fan command",
                value: command,
                max: u16::MAX.into(),
            });
        }
        Ok(FanRate {
            mode,
            command: command as u16,
        })
    }
}
