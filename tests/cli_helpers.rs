//! Integration tests for the CLI helper library.
//!
//! These cover the public API the binary builds on: argument parsing,
//! output formatting and config merging.

use max31785k::args::{parse_address, parse_u8, split_number};
use max31785k::{format, Backend, Config, FanRate, Overrides, Width};
use pmbus_fan::FanMode;

#[test]
fn get_command_arguments() {
    // max31785k get 0x52 0x9a s
    assert_eq!(parse_address("0x52").unwrap(), 0x52);
    assert_eq!(parse_u8("0x9a").unwrap(), 0x9A);
    assert_eq!("s".parse::<Width>().unwrap(), Width::Block);
}

#[test]
fn octal_register_like_strtoul() {
    assert_eq!(parse_u8("072").unwrap(), 0x3A);
}

#[test]
fn fan_rate_suffix_split() {
    assert_eq!(split_number("0x10%").unwrap(), (16, "%"));
    let rate: FanRate = "0x10%".parse().unwrap();
    assert_eq!(rate.mode, FanMode::Pwm);
    assert_eq!(rate.command, 1600);

    let rate: FanRate = "3000Rpm".parse().unwrap();
    assert_eq!(rate.mode, FanMode::Rpm);
    assert_eq!(rate.command, 3000);
}

#[test]
fn block_dump_mixes_ascii_and_hex() {
    let rows = format::block_dump(b"MAXIM\x01\xff");
    assert_eq!(rows, vec!["0x00:  M  A  X  I  M 01 ff "]);
}

#[test]
fn config_file_then_flags() {
    let config = Config::parse("device = \"/dev/hidraw2\"\nbackend = \"hidraw\"")
        .unwrap()
        .with_overrides(Overrides {
            backend: Some(Backend::Hidapi),
            address: Some(0x53),
            ..Default::default()
        });
    assert_eq!(config.backend, Backend::Hidapi);
    assert_eq!(config.address, 0x53);
    assert_eq!(
        config.device_path().unwrap(),
        std::path::Path::new("/dev/hidraw2")
    );
}
