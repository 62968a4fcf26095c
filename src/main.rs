// max31785k - MAX31785 fan controller tool for DS3900 USB-HID adapters

mod cli;
mod commands;

use clap::Parser;
use std::process::ExitCode;
use tracing::debug;

use cli::{Cli, Commands, FanCommands, SpeedCommands};
use commands::CommandResult;
use max31785k::{Config, Overrides};

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Transfer failure: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CommandResult {
    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    debug!("Loading config from {:?}", config_path);
    let config = Config::load(&config_path)?.with_overrides(Overrides {
        device: cli.device,
        backend: cli.backend,
        address: cli.address,
        timeout_ms: cli.timeout_ms,
    });

    let monitor_config =
        commands::create_monitor_config(cli.monitor, cli.hex, cli.filter.as_deref())?;
    let mut channel = commands::open_channel(&config, monitor_config)?;

    match cli.command {
        Commands::Revision => commands::adapter::revision(&mut channel),
        Commands::Device { addr } => commands::adapter::device(&mut channel, addr),
        Commands::Get { dev, reg, width } => {
            commands::register::get(&mut channel, dev, reg, width)
        }
        Commands::Set {
            dev,
            reg,
            val,
            width,
        } => commands::register::set(&mut channel, dev, reg, val, width),
        Commands::Fan {
            command: FanCommands::Speed { command },
        } => match command {
            SpeedCommands::Get { page, fan } => {
                commands::fan::speed_get(&mut channel, config.address, page, fan)
            }
            SpeedCommands::Set { page, fan, rate } => {
                commands::fan::speed_set(&mut channel, config.address, page, fan, rate)
            }
        },
        Commands::ThrashPages { iterations } => {
            commands::debug::thrash_pages(&mut channel, config.address, iterations)
        }
    }
}
