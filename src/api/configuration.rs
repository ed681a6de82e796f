//! Active modem configuration of a session
//!
//! Setup stores whatever the caller sent without checking it. Fields are only
//! interpreted on Connect, through the accessors below, so a bad preset key
//! or channel is reported by Connect rather than by Setup.

use crate::api::args::{byte_sequence, Arguments};
use crate::api::types::{SessionError, SessionResult};
use crate::core::{
    setup_keys, CONFIG_FSK, CONFIG_GFSK, CONFIG_WHITE, DEFAULT_CHANNEL, DEFAULT_MODEM_CONFIG,
    MODEM_RATES,
};
use crate::hardware::StructuredPreset;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The four modem settings, kept in their wire form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Preset name to register value sequence
    #[serde(rename = "MODEM_CONFIG_TABLE")]
    pub config_table: Value,
    /// Key into `config_table`, or a structured preset
    #[serde(rename = "MODEM_CONFIG")]
    pub active_preset: Value,
    /// AES key as text or byte list; null or empty disables encryption
    #[serde(rename = "key")]
    pub encryption_key: Value,
    /// Network id the radio joins
    pub channel: Value,
}

/// Interpreted form of `active_preset`
#[derive(Debug, Clone, PartialEq)]
pub enum ModemPreset {
    /// Entry of the register table
    Named(String),
    /// Handed to the driver untouched
    Structured(StructuredPreset),
}

/// Built-in register table: every rate in FSK and GFSK flavours.
pub fn default_config_table() -> Value {
    let mut table = Map::new();
    for (shaping, datamodul) in [("FSK", CONFIG_FSK), ("GFSK", CONFIG_GFSK)] {
        for (rate, registers) in MODEM_RATES.iter() {
            let values = std::iter::once(datamodul)
                .chain(registers.iter().copied())
                .chain(std::iter::once(CONFIG_WHITE))
                .map(Value::from)
                .collect();
            table.insert(format!("{}_{}", shaping, rate), Value::Array(values));
        }
    }
    Value::Object(table)
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            config_table: default_config_table(),
            active_preset: Value::from(DEFAULT_MODEM_CONFIG),
            encryption_key: Value::Null,
            channel: Value::from(DEFAULT_CHANNEL),
        }
    }
}

impl Configuration {
    /// Fresh configuration: `defaults` overlaid with the fields present in `args`.
    ///
    /// Nothing from the previous configuration survives and nothing is checked.
    pub fn overlay(defaults: &Configuration, args: &Arguments) -> Self {
        let pick = |key: &str, fallback: &Value| args.get(key).cloned().unwrap_or_else(|| fallback.clone());

        for key in args.keys() {
            if ![
                setup_keys::CONFIG_TABLE,
                setup_keys::ACTIVE_PRESET,
                setup_keys::ENCRYPTION_KEY,
                setup_keys::CHANNEL,
            ]
            .contains(&key.as_str())
            {
                debug!("Setup: ignoring unknown parameter {}", key);
            }
        }

        Self {
            config_table: pick(setup_keys::CONFIG_TABLE, &defaults.config_table),
            active_preset: pick(setup_keys::ACTIVE_PRESET, &defaults.active_preset),
            encryption_key: pick(setup_keys::ENCRYPTION_KEY, &defaults.encryption_key),
            channel: pick(setup_keys::CHANNEL, &defaults.channel),
        }
    }

    /// Network id, one byte
    pub fn channel(&self) -> SessionResult<u8> {
        self.channel
            .as_u64()
            .and_then(|channel| u8::try_from(channel).ok())
            .ok_or_else(|| {
                SessionError::configuration(
                    "channel",
                    format!("expected an integer between 0 and 255, got {}", self.channel),
                )
            })
    }

    pub fn preset(&self) -> SessionResult<ModemPreset> {
        match &self.active_preset {
            Value::String(name) => Ok(ModemPreset::Named(name.clone())),
            Value::Object(_) => serde_json::from_value(self.active_preset.clone())
                .map(ModemPreset::Structured)
                .map_err(|err| SessionError::configuration("MODEM_CONFIG", err.to_string())),
            other => Err(SessionError::configuration(
                "MODEM_CONFIG",
                format!("expected a preset name or object, got {}", other),
            )),
        }
    }

    /// Register values stored under `name` in the table
    pub fn preset_values(&self, name: &str) -> SessionResult<Vec<u8>> {
        let table = self.config_table.as_object().ok_or_else(|| {
            SessionError::configuration("MODEM_CONFIG_TABLE", "expected a mapping of presets")
        })?;
        let entry = table.get(name).ok_or_else(|| {
            SessionError::configuration("MODEM_CONFIG", format!("no preset named {}", name))
        })?;
        byte_sequence(entry).ok_or_else(|| {
            SessionError::configuration(
                "MODEM_CONFIG_TABLE",
                format!("preset {} is not a list of register values", name),
            )
        })
    }

    /// Key bytes, or `None` when encryption stays off
    pub fn encryption_key(&self) -> SessionResult<Option<Vec<u8>>> {
        let key = match &self.encryption_key {
            Value::Null => return Ok(None),
            Value::String(text) => text.as_bytes().to_vec(),
            other => byte_sequence(other).ok_or_else(|| {
                SessionError::configuration("key", "expected text or a list of bytes")
            })?,
        };
        Ok(if key.is_empty() { None } else { Some(key) })
    }

    /// Interpret every field the way Connect will
    pub fn validate(&self) -> SessionResult<()> {
        self.channel()?;
        self.encryption_key()?;
        if let ModemPreset::Named(name) = self.preset()? {
            self.preset_values(&name)?;
        }
        Ok(())
    }
}
