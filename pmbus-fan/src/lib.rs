//! PMBus paged register access and MAX31785 fan control
//!
//! Builds on the SMBus byte/word primitives of `ds3900-transport`. Every
//! access first selects a PMBus page, so callers address registers as
//! `(page, register)` pairs.

pub mod error;
pub mod fan;
pub mod pmbus;
pub mod registers;

pub use error::PmbusError;
pub use fan::{
    fan_command_get, fan_command_set, fan_config_get_enabled, fan_config_get_mode,
    fan_config_get_pulse, fan_config_set_mode, read_fan_speed, Fan, FanController, FanMode,
    FanReading, SetOutcome, PWM_FULL_SCALE,
};
pub use pmbus::{read_byte, read_word, write_byte, write_word};

/// Default 7-bit SMBus address of a MAX31785
pub const MAX31785_ADDRESS: u8 = 0x52;
