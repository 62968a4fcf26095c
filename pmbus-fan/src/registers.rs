//! PMBus command codes used by the MAX31785 fan controller

/// Page select; every paged access writes this first
pub const PAGE: u8 = 0x00;

pub const FAN_CONFIG_12: u8 = 0x3A;
pub const FAN_COMMAND_1: u8 = 0x3B;
pub const FAN_COMMAND_2: u8 = 0x3C;
pub const FAN_CONFIG_34: u8 = 0x3D;
pub const FAN_COMMAND_3: u8 = 0x3E;
pub const FAN_COMMAND_4: u8 = 0x3F;

pub const STATUS_BYTE: u8 = 0x78;
pub const STATUS_WORD: u8 = 0x79;
pub const STATUS_CML: u8 = 0x7E;
pub const STATUS_OTHER: u8 = 0x7F;
pub const STATUS_FANS_12: u8 = 0x81;
pub const STATUS_FANS_34: u8 = 0x82;

pub const READ_FAN_SPEED_1: u8 = 0x90;
pub const READ_FAN_SPEED_2: u8 = 0x91;
pub const READ_FAN_SPEED_3: u8 = 0x92;
pub const READ_FAN_SPEED_4: u8 = 0x93;

pub const MFR_ID: u8 = 0x99;
pub const MFR_MODEL: u8 = 0x9A;
pub const MFR_REVISION: u8 = 0x9B;

/// Number of pages exposed by the MAX31785
pub const PAGE_COUNT: u8 = 22;

/// FAN_CONFIG_12 / FAN_CONFIG_34 bit layout
///
/// Each register packs two fans: the odd fan (1 or 3) in the high nibble and
/// the even fan (2 or 4) in the low nibble.
pub mod fan_config {
    pub const HIGH_ENABLED: u8 = 1 << 7;
    pub const HIGH_MODE: u8 = 1 << 6;
    pub const HIGH_PULSE: u8 = 0b0011_0000;
    pub const LOW_ENABLED: u8 = 1 << 3;
    pub const LOW_MODE: u8 = 1 << 2;
    pub const LOW_PULSE: u8 = 0b0000_0011;
}

/// Human-readable name for a register, for logging
pub fn name(register: u8) -> &'static str {
    match register {
        PAGE => "PAGE",
        FAN_CONFIG_12 => "FAN_CONFIG_12",
        FAN_COMMAND_1 => "FAN_COMMAND_1",
        FAN_COMMAND_2 => "FAN_COMMAND_2",
        FAN_CONFIG_34 => "FAN_CONFIG_34",
        FAN_COMMAND_3 => "FAN_COMMAND_3",
        FAN_COMMAND_4 => "FAN_COMMAND_4",
        STATUS_BYTE => "STATUS_BYTE",
        STATUS_WORD => "STATUS_WORD",
        STATUS_CML => "STATUS_CML",
        STATUS_OTHER => "STATUS_OTHER",
        STATUS_FANS_12 => "STATUS_FANS_12",
        STATUS_FANS_34 => "STATUS_FANS_34",
        READ_FAN_SPEED_1 => "READ_FAN_SPEED_1",
        READ_FAN_SPEED_2 => "READ_FAN_SPEED_2",
        READ_FAN_SPEED_3 => "READ_FAN_SPEED_3",
        READ_FAN_SPEED_4 => "READ_FAN_SPEED_4",
        MFR_ID => "MFR_ID",
        MFR_MODEL => "MFR_MODEL",
        MFR_REVISION => "MFR_REVISION",
        _ => "UNKNOWN",
    }
}
