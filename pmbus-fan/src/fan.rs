//! MAX31785 fan configuration and speed control
//!
//! Fans are addressed by page plus [`Fan`] slot. Two fans share each config
//! register, so mode changes are read-modify-write and leave the sibling
//! fan's bits untouched.

use std::fmt;

use ds3900_transport::Channel;
use tracing::debug;

use crate::error::PmbusError;
use crate::pmbus;
use crate::registers::{self, fan_config};

/// PWM command for 100% duty (units of 0.01%)
pub const PWM_FULL_SCALE: u16 = 10_000;

/// Fan slot within a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Fan {
    Fan1 = 1,
    Fan2 = 2,
    Fan3 = 3,
    Fan4 = 4,
}

impl Fan {
    pub const ALL: [Fan; 4] = [Fan::Fan1, Fan::Fan2, Fan::Fan3, Fan::Fan4];

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Config register shared with the sibling fan
    pub fn config_register(self) -> u8 {
        match self {
            Fan::Fan1 | Fan::Fan2 => registers::FAN_CONFIG_12,
            Fan::Fan3 | Fan::Fan4 => registers::FAN_CONFIG_34,
        }
    }

    fn is_high_nibble(self) -> bool {
        matches!(self, Fan::Fan1 | Fan::Fan3)
    }

    pub fn enabled_flag(self) -> u8 {
        if self.is_high_nibble() {
            fan_config::HIGH_ENABLED
        } else {
            fan_config::LOW_ENABLED
        }
    }

    pub fn mode_flag(self) -> u8 {
        if self.is_high_nibble() {
            fan_config::HIGH_MODE
        } else {
            fan_config::LOW_MODE
        }
    }

    pub fn pulse_mask(self) -> u8 {
        if self.is_high_nibble() {
            fan_config::HIGH_PULSE
        } else {
            fan_config::LOW_PULSE
        }
    }

    pub fn command_register(self) -> u8 {
        match self {
            Fan::Fan1 => registers::FAN_COMMAND_1,
            Fan::Fan2 => registers::FAN_COMMAND_2,
            Fan::Fan3 => registers::FAN_COMMAND_3,
            Fan::Fan4 => registers::FAN_COMMAND_4,
        }
    }

    pub fn speed_register(self) -> u8 {
        match self {
            Fan::Fan1 => registers::READ_FAN_SPEED_1,
            Fan::Fan2 => registers::READ_FAN_SPEED_2,
            Fan::Fan3 => registers::READ_FAN_SPEED_3,
            Fan::Fan4 => registers::READ_FAN_SPEED_4,
        }
    }
}

impl TryFrom<u8> for Fan {
    type Error = PmbusError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Fan::Fan1),
            2 => Ok(Fan::Fan2),
            3 => Ok(Fan::Fan3),
            4 => Ok(Fan::Fan4),
            other => Err(PmbusError::InvalidFan(other)),
        }
    }
}

impl fmt::Display for Fan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// How the fan command register is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FanMode {
    /// Command is duty cycle in hundredths of a percent
    #[default]
    Pwm = 0,
    /// Command is target speed in RPM
    Rpm = 1,
}

impl FanMode {
    /// Unit suffix used when printing a commanded rate
    pub fn unit(self) -> &'static str {
        match self {
            FanMode::Pwm => "% duty",
            FanMode::Rpm => "RPM",
        }
    }
}

pub fn fan_config_get_enabled<C: Channel + ?Sized>(
    channel: &mut C,
    page: u8,
    fan: Fan,
) -> Result<bool, PmbusError> {
    let config = pmbus::read_byte(channel, page, fan.config_register())?;
    Ok(config & fan.enabled_flag() != 0)
}

pub fn fan_config_get_mode<C: Channel + ?Sized>(
    channel: &mut C,
    page: u8,
    fan: Fan,
) -> Result<FanMode, PmbusError> {
    let config = pmbus::read_byte(channel, page, fan.config_register())?;
    Ok(if config & fan.mode_flag() != 0 {
        FanMode::Rpm
    } else {
        FanMode::Pwm
    })
}

/// Raw tachometer pulses-per-revolution field (0..=3)
pub fn fan_config_get_pulse<C: Channel + ?Sized>(
    channel: &mut C,
    page: u8,
    fan: Fan,
) -> Result<u8, PmbusError> {
    let config = pmbus::read_byte(channel, page, fan.config_register())?;
    let mask = fan.pulse_mask();
    Ok((config & mask) >> mask.trailing_zeros())
}

pub fn fan_config_set_mode<C: Channel + ?Sized>(
    channel: &mut C,
    page: u8,
    fan: Fan,
    mode: FanMode,
) -> Result<(), PmbusError> {
    let register = fan.config_register();
    let flag = fan.mode_flag();
    let current = pmbus::read_byte(channel, page, register)?;
    let updated = match mode {
        FanMode::Pwm => current & !flag,
        FanMode::Rpm => current | flag,
    };
    debug!("Fan {page}:{fan} mode {mode:?} (config 0x{current:02X} -> 0x{updated:02X})");
    pmbus::write_byte(channel, page, register, updated)
}

pub fn fan_command_get<C: Channel + ?Sized>(
    channel: &mut C,
    page: u8,
    fan: Fan,
) -> Result<u16, PmbusError> {
    pmbus::read_word(channel, page, fan.command_register())
}

pub fn fan_command_set<C: Channel + ?Sized>(
    channel: &mut C,
    page: u8,
    fan: Fan,
    rate: u16,
) -> Result<(), PmbusError> {
    pmbus::write_word(channel, page, fan.command_register(), rate)
}

pub fn read_fan_speed<C: Channel + ?Sized>(
    channel: &mut C,
    page: u8,
    fan: Fan,
) -> Result<u16, PmbusError> {
    pmbus::read_word(channel, page, fan.speed_register())
}

/// Snapshot of one fan's configuration and measured speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FanReading {
    Disabled,
    /// Negative command: the controller is running its own fan curve
    Automatic { measured_rpm: u16 },
    Commanded {
        mode: FanMode,
        /// RPM, or whole percent duty in PWM mode
        rate: i16,
        measured_rpm: u16,
    },
}

impl FanReading {
    pub fn describe(&self, page: u8, fan: Fan) -> String {
        match *self {
            FanReading::Disabled => format!("Fan {page}:{fan} is disabled"),
            FanReading::Automatic { measured_rpm } => {
                format!("Automatic fan control, measured {measured_rpm}RPM")
            }
            FanReading::Commanded {
                mode,
                rate,
                measured_rpm,
            } => format!(
                "Commanded {rate}{}, measured {measured_rpm}RPM",
                mode.unit()
            ),
        }
    }
}

/// Outcome of [`FanController::set_rate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Applied,
    /// Fan disabled in config; nothing written
    Disabled,
}

/// Fan operations bound to one channel and page
///
/// The PMBus target must already be selected on the adapter.
pub struct FanController<C> {
    channel: C,
    page: u8,
}

impl<C: Channel> FanController<C> {
    pub fn new(channel: C, page: u8) -> Self {
        Self { channel, page }
    }

    pub fn page(&self) -> u8 {
        self.page
    }

    pub fn set_page(&mut self, page: u8) {
        self.page = page;
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn into_inner(self) -> C {
        self.channel
    }

    pub fn is_enabled(&mut self, fan: Fan) -> Result<bool, PmbusError> {
        fan_config_get_enabled(&mut self.channel, self.page, fan)
    }

    pub fn mode(&mut self, fan: Fan) -> Result<FanMode, PmbusError> {
        fan_config_get_mode(&mut self.channel, self.page, fan)
    }

    pub fn set_mode(&mut self, fan: Fan, mode: FanMode) -> Result<(), PmbusError> {
        fan_config_set_mode(&mut self.channel, self.page, fan, mode)
    }

    pub fn command(&mut self, fan: Fan) -> Result<u16, PmbusError> {
        fan_command_get(&mut self.channel, self.page, fan)
    }

    pub fn set_command(&mut self, fan: Fan, rate: u16) -> Result<(), PmbusError> {
        fan_command_set(&mut self.channel, self.page, fan, rate)
    }

    pub fn speed(&mut self, fan: Fan) -> Result<u16, PmbusError> {
        read_fan_speed(&mut self.channel, self.page, fan)
    }

    /// Read enabled state, mode, command and measured speed
    ///
    /// The command register is signed; PWM commands are scaled down to whole
    /// percent.
    pub fn reading(&mut self, fan: Fan) -> Result<FanReading, PmbusError> {
        if !self.is_enabled(fan)? {
            return Ok(FanReading::Disabled);
        }
        let mode = self.mode(fan)?;
        let mut rate = self.command(fan)? as i16;
        if mode == FanMode::Pwm {
            rate /= 100;
        }
        let measured_rpm = self.speed(fan)?;
        Ok(if rate < 0 {
            FanReading::Automatic { measured_rpm }
        } else {
            FanReading::Commanded {
                mode,
                rate,
                measured_rpm,
            }
        })
    }

    /// Switch `fan` to `mode` and write the raw command value
    ///
    /// `command` is RPM, or hundredths of a percent in PWM mode. PWM commands
    /// above 100% are rejected before any bus traffic.
    pub fn set_rate(&mut self, fan: Fan, mode: FanMode, command: u16) -> Result<SetOutcome, PmbusError> {
        if mode == FanMode::Pwm && command > PWM_FULL_SCALE {
            return Err(PmbusError::InvalidParameter(format!(
                "PWM duty {}.{:02}% exceeds 100%",
                command / 100,
                command % 100
            )));
        }
        if !self.is_enabled(fan)? {
            return Ok(SetOutcome::Disabled);
        }
        self.set_mode(fan, mode)?;
        self.set_command(fan, command)?;
        Ok(SetOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ds3900_transport::emulator::Ds3900Emulator;
    use ds3900_transport::set_device_address;

    fn emulator() -> Ds3900Emulator {
        let mut emu = Ds3900Emulator::new(0x52);
        set_device_address(&mut emu, 0x52).unwrap();
        emu
    }

    #[test]
    fn test_fan_try_from() {
        assert_eq!(Fan::try_from(3).unwrap(), Fan::Fan3);
        assert!(matches!(Fan::try_from(0), Err(PmbusError::InvalidFan(0))));
        assert!(matches!(Fan::try_from(5), Err(PmbusError::InvalidFan(5))));
    }

    #[test]
    fn test_register_tables() {
        assert_eq!(Fan::Fan2.config_register(), 0x3A);
        assert_eq!(Fan::Fan3.config_register(), 0x3D);
        assert_eq!(Fan::Fan3.enabled_flag(), 0x80);
        assert_eq!(Fan::Fan4.mode_flag(), 0x04);
        let commands: Vec<u8> = Fan::ALL.iter().map(|f| f.command_register()).collect();
        assert_eq!(commands, vec![0x3B, 0x3C, 0x3E, 0x3F]);
        let speeds: Vec<u8> = Fan::ALL.iter().map(|f| f.speed_register()).collect();
        assert_eq!(speeds, vec![0x90, 0x91, 0x92, 0x93]);
    }

    #[test]
    fn test_set_mode_preserves_sibling_bits() {
        let mut emu = emulator();
        emu.set_register(4, 0x3A, &[0b1011_1001]);
        fan_config_set_mode(&mut emu, 4, Fan::Fan2, FanMode::Rpm).unwrap();
        assert_eq!(emu.register(4, 0x3A), Some(&[0b1011_1101][..]));
        fan_config_set_mode(&mut emu, 4, Fan::Fan1, FanMode::Pwm).unwrap();
        assert_eq!(emu.register(4, 0x3A), Some(&[0b1011_1101][..]));
        fan_config_set_mode(&mut emu, 4, Fan::Fan1, FanMode::Rpm).unwrap();
        assert_eq!(emu.register(4, 0x3A), Some(&[0b1111_1101][..]));
    }

    #[test]
    fn test_pulse_field() {
        let mut emu = emulator();
        emu.set_register(0, 0x3D, &[0b1010_1001]);
        assert_eq!(fan_config_get_pulse(&mut emu, 0, Fan::Fan3).unwrap(), 2);
        assert_eq!(fan_config_get_pulse(&mut emu, 0, Fan::Fan4).unwrap(), 1);
    }

    #[test]
    fn test_reading_disabled() {
        let mut controller = FanController::new(emulator(), 1);
        controller.channel_mut().set_register(1, 0x3A, &[0x08]);
        assert_eq!(controller.reading(Fan::Fan1).unwrap(), FanReading::Disabled);
        assert_eq!(
            FanReading::Disabled.describe(1, Fan::Fan1),
            "Fan 1:1 is disabled"
        );
    }

    #[test]
    fn test_reading_pwm_scaled_to_percent() {
        let mut emu = emulator();
        emu.set_register(0, 0x3A, &[0x80]);
        emu.set_register(0, 0x3B, &4000u16.to_le_bytes());
        emu.set_register(0, 0x90, &1234u16.to_le_bytes());
        let mut controller = FanController::new(emu, 0);
        let reading = controller.reading(Fan::Fan1).unwrap();
        assert_eq!(
            reading,
            FanReading::Commanded {
                mode: FanMode::Pwm,
                rate: 40,
                measured_rpm: 1234
            }
        );
        assert_eq!(
            reading.describe(0, Fan::Fan1),
            "Commanded 40% duty, measured 1234RPM"
        );
    }

    #[test]
    fn test_reading_negative_command_is_automatic() {
        let mut emu = emulator();
        emu.set_register(2, 0x3D, &[0x0C]);
        emu.set_register(2, 0x3F, &0xFFFFu16.to_le_bytes());
        emu.set_register(2, 0x93, &900u16.to_le_bytes());
        let mut controller = FanController::new(emu, 2);
        let reading = controller.reading(Fan::Fan4).unwrap();
        assert_eq!(reading, FanReading::Automatic { measured_rpm: 900 });
        assert_eq!(
            reading.describe(2, Fan::Fan4),
            "Automatic fan control, measured 900RPM"
        );
    }

    #[test]
    fn test_set_rate_applies_mode_then_command() {
        let mut emu = emulator();
        emu.set_register(0, 0x3D, &[0x80]);
        let mut controller = FanController::new(emu, 0);
        let outcome = controller.set_rate(Fan::Fan3, FanMode::Rpm, 3000).unwrap();
        assert_eq!(outcome, SetOutcome::Applied);
        let emu = controller.into_inner();
        assert_eq!(emu.register(0, 0x3D), Some(&[0xC0][..]));
        assert_eq!(emu.register(0, 0x3E), Some(&3000u16.to_le_bytes()[..]));
    }

    #[test]
    fn test_set_rate_skips_disabled_fan() {
        let mut emu = emulator();
        emu.set_register(0, 0x3A, &[0x00]);
        let mut controller = FanController::new(emu, 0);
        let outcome = controller.set_rate(Fan::Fan2, FanMode::Pwm, 5000).unwrap();
        assert_eq!(outcome, SetOutcome::Disabled);
        assert_eq!(controller.into_inner().register(0, 0x3C), None);
    }

    #[test]
    fn test_set_rate_rejects_pwm_above_full_scale() {
        let mut emu = emulator();
        emu.set_register(0, 0x3A, &[0x80]);
        let sent = emu.frames().len();
        let mut controller = FanController::new(emu, 0);
        let err = controller
            .set_rate(Fan::Fan1, FanMode::Pwm, PWM_FULL_SCALE + 1)
            .unwrap_err();
        assert!(matches!(err, PmbusError::InvalidParameter(_)));
        let emu = controller.into_inner();
        assert_eq!(emu.frames().len(), sent);
        assert_eq!(emu.register(0, 0x3B), None);

        // RPM commands have no such ceiling
        let mut controller = FanController::new(emu, 0);
        let outcome = controller.set_rate(Fan::Fan1, FanMode::Rpm, 12_000).unwrap();
        assert_eq!(outcome, SetOutcome::Applied);
    }
}
