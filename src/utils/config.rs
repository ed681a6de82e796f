use crate::api::{BoundedWait, Configuration, SessionError};
use crate::core::{
    BUS_NAME, DEFAULT_SOCKET_PATH, PROTOCOL_NAME, PROTOCOL_PATH, RECEIVE_POLL_INTERVAL_MS,
    RECEIVE_TIMEOUT_MS,
};
use crate::hardware::RadioParameters;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Service-wide configuration, loaded once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Naming and transport of the bus service
    pub service: ServiceSettings,
    /// Board wiring and addressing of the radio
    pub radio: RadioParameters,
    /// Fallback values for every Setup field
    pub modem: Configuration,
    /// Receive wait policy
    pub receive: ReceiveSettings,
}

/// Identity of the service on the bus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Returned by the `Name` operation
    pub name: String,
    pub object_path: String,
    pub bus_name: String,
    /// Unix socket the bus server listens on
    pub socket_path: PathBuf,
}

/// How long Receive waits and how often it polls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiveSettings {
    pub timeout_ms: u64,
    pub poll_interval_ms: u64,
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {parameter} = {value}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    #[error("Configuration file error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration format error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid modem defaults: {0}")]
    Modem(#[from] SessionError),
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: PROTOCOL_NAME.to_string(),
            object_path: PROTOCOL_PATH.to_string(),
            bus_name: BUS_NAME.to_string(),
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
        }
    }
}

impl Default for ReceiveSettings {
    fn default() -> Self {
        Self {
            timeout_ms: RECEIVE_TIMEOUT_MS,
            poll_interval_ms: RECEIVE_POLL_INTERVAL_MS,
        }
    }
}

impl ReceiveSettings {
    pub fn bounded_wait(&self) -> BoundedWait {
        BoundedWait::from_millis(self.poll_interval_ms, self.timeout_ms)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service: ServiceSettings::default(),
            radio: RadioParameters::default(),
            modem: Configuration::default(),
            receive: ReceiveSettings::default(),
        }
    }
}

impl ServiceConfig {
    /// Load and validate a configuration file.
    ///
    /// Sections or fields missing from the file keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config: ServiceConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Write this configuration as pretty JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        Ok(())
    }

    /// Check the values the service cannot run without.
    ///
    /// The modem defaults are interpreted the same way Connect does, so a
    /// broken default is caught at startup instead of on first use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.name.is_empty() {
            return Err(ConfigError::InvalidParameter {
                parameter: "service.name".to_string(),
                value: "\"\"".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        if self.receive.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "receive.poll_interval_ms".to_string(),
                value: "0".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        if self.receive.poll_interval_ms > self.receive.timeout_ms {
            return Err(ConfigError::InvalidParameter {
                parameter: "receive.poll_interval_ms".to_string(),
                value: self.receive.poll_interval_ms.to_string(),
                reason: format!("longer than receive.timeout_ms ({})", self.receive.timeout_ms),
            });
        }

        self.modem.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::{DriverVariant, FrequencyBand};
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.service.name, "RFM69");
        assert_eq!(config.service.object_path, "/iot/agile/protocol/RFM69");
        assert_eq!(config.service.bus_name, "iot.agile.protocol.RFM69");
        assert_eq!(config.radio.frequency_band, FrequencyBand::Mhz868);
        assert_eq!(config.receive.timeout_ms, 5000);
        assert_eq!(config.receive.poll_interval_ms, 50);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rfm69.json");

        let mut config = ServiceConfig::default();
        config.radio.driver = DriverVariant::Preset;
        config.modem.channel = json!(12);
        config.save_to_file(&path).unwrap();

        let loaded = ServiceConfig::from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"radio": {{"driver": "preset", "frequency_band": "433"}}, "modem": {{"channel": 7}}}}"#
        )
        .unwrap();

        let config = ServiceConfig::from_file(file.path()).unwrap();
        assert_eq!(config.radio.driver, DriverVariant::Preset);
        assert_eq!(config.radio.frequency_band, FrequencyBand::Mhz433);
        assert_eq!(config.radio.reset_pin, 22);
        assert_eq!(config.modem.channel, json!(7));
        assert_eq!(config.modem.active_preset, json!("GFSK_Rb250Fd250"));
        assert_eq!(config.service.name, "RFM69");
    }

    #[test]
    fn test_invalid_modem_defaults_rejected() {
        let mut config = ServiceConfig::default();
        config.modem.active_preset = json!("not-a-preset");
        assert!(matches!(config.validate(), Err(ConfigError::Modem(_))));
    }

    #[test]
    fn test_invalid_receive_settings_rejected() {
        let mut config = ServiceConfig::default();
        config.receive.poll_interval_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidParameter { .. })
        ));

        let mut config = ServiceConfig::default();
        config.receive.timeout_ms = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file() {
        let result = ServiceConfig::from_file("/nonexistent/rfm69.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
