// max31785k - shared helpers for the command-line tool
// Argument parsing, output formatting and the config file

pub mod args;
pub mod config;
pub mod format;

pub use args::{FanRate, ParseArgError, Width};
pub use config::{Backend, Config, Overrides};
