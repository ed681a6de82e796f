//! # RFM69 bus service entry point
//!
//! Parses the command line, initialises logging and then either serves the
//! protocol interface on the bus socket or performs a single call against
//! a running service.

mod cli;

use std::fs::File;

use cli::*;
use log::*;
use rfm69_bus::api::Session;
use rfm69_bus::bus::{BusClient, BusServer, Dispatcher};
use rfm69_bus::core::PROTOCOL_INTERFACE;
use rfm69_bus::hardware::MockRadioFactory;
use rfm69_bus::utils::ServiceConfig;
use simplelog::{ColorChoice, CombinedLogger, LevelFilter, SharedLogger, TermLogger, TerminalMode, WriteLogger};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = argh::from_env();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        args.level,
        simplelog::ConfigBuilder::new().build(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = &args.log_file {
        loggers.push(WriteLogger::new(
            LevelFilter::Warn,
            simplelog::ConfigBuilder::new().set_location_level(LevelFilter::Error).build(),
            File::create(path)?,
        ));
    }
    CombinedLogger::init(loggers)?;
    debug!("Parsed args and initialized CombinedLogger");

    let config = args.service_config()?;
    match &args.subcommand {
        SubCommandsArgs::Serve(serve) => run_server(serve.overlay_subcommand_args(config)),
        SubCommandsArgs::Call(call) => run_call(&config, call),
    }
}

fn run_server(config: ServiceConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        "Exporting {} at {} as {} ({})",
        config.service.name, config.service.object_path, config.service.bus_name, PROTOCOL_INTERFACE
    );
    if config.radio.simulate_traffic {
        info!("Simulated {} radio will report bench frames", config.radio.driver);
    }

    let session = Session::new(&config, Box::new(MockRadioFactory::new()));
    let mut dispatcher = Dispatcher::new(session);
    let server = BusServer::bind(&config.service.socket_path)?;
    server.serve(&mut dispatcher)?;
    Ok(())
}

fn run_call(config: &ServiceConfig, call: &CallSubcommandArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut client = BusClient::connect(call.socket_path(config))?;
    let reply = client.call(&call.method, call.parse_args()?)?;
    println!("{}", serde_json::to_string_pretty(&reply)?);
    Ok(())
}
