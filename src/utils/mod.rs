//! Utility modules for service configuration

pub mod config;

pub use config::{ConfigError, ReceiveSettings, ServiceConfig, ServiceSettings};
