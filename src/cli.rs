use std::path::PathBuf;

use argh::FromArgs;
use rfm69_bus::utils::{ConfigError, ServiceConfig};
use serde_json::Value;
use simplelog::LevelFilter;

/// RFM69 radio exposed as a protocol service on a local bus
#[derive(FromArgs, Debug)]
pub struct Args {
    /// path to a JSON configuration file
    #[argh(option, short = 'c')]
    pub config: Option<PathBuf>,

    /// log level to use for terminal logging
    #[argh(option, default = "LevelFilter::Info")]
    pub level: LevelFilter,

    /// file receiving warnings and errors in addition to the terminal
    #[argh(option)]
    pub log_file: Option<PathBuf>,

    #[argh(subcommand)]
    pub subcommand: SubCommandsArgs,
}

#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand)]
pub enum SubCommandsArgs {
    Serve(ServeSubcommandArgs),
    Call(CallSubcommandArgs),
}

/// Serve the protocol interface on the bus socket
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "serve")]
pub struct ServeSubcommandArgs {
    /// socket path, overriding the configuration
    #[argh(option)]
    pub socket: Option<PathBuf>,

    /// feed canned frames to the simulated radio
    #[argh(switch)]
    pub simulate_traffic: bool,
}

/// Invoke one method on a running service and print the reply
#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "call")]
pub struct CallSubcommandArgs {
    /// socket path, overriding the configuration
    #[argh(option)]
    pub socket: Option<PathBuf>,

    /// method name, e.g. Connect or Send
    #[argh(positional)]
    pub method: String,

    /// method arguments as JSON, e.g. '{"ID": 2, "DATA": [1, 2]}'
    #[argh(positional)]
    pub args: Option<String>,
}

impl Args {
    /// Load the configuration file if one was given, defaults otherwise
    pub fn service_config(&self) -> Result<ServiceConfig, ConfigError> {
        match &self.config {
            Some(path) => ServiceConfig::from_file(path),
            None => Ok(ServiceConfig::default()),
        }
    }
}

impl ServeSubcommandArgs {
    pub fn overlay_subcommand_args(&self, mut config: ServiceConfig) -> ServiceConfig {
        if let Some(socket) = &self.socket {
            config.service.socket_path = socket.clone();
        }
        if self.simulate_traffic {
            config.radio.simulate_traffic = true;
        }
        config
    }
}

impl CallSubcommandArgs {
    pub fn socket_path(&self, config: &ServiceConfig) -> PathBuf {
        self.socket.clone().unwrap_or_else(|| config.service.socket_path.clone())
    }

    pub fn parse_args(&self) -> Result<Value, serde_json::Error> {
        match &self.args {
            Some(text) => serde_json::from_str(text),
            None => Ok(Value::Null),
        }
    }
}
