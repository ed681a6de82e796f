//! Applying a configuration to a freshly built driver

use crate::api::configuration::{Configuration, ModemPreset};
use crate::api::types::SessionResult;
use crate::core::MODEM_REGISTERS;
use crate::hardware::RadioDriver;
use log::debug;

/// Pair preset values with the modem registers, position by position.
///
/// The shorter side decides how many writes happen; peers rely on this order.
pub fn register_writes(values: &[u8]) -> impl Iterator<Item = (u8, u8)> + '_ {
    MODEM_REGISTERS.iter().copied().zip(values.iter().copied())
}

/// Write the active preset and, when present, the encryption key.
pub fn apply_configuration(driver: &mut dyn RadioDriver, config: &Configuration) -> SessionResult<()> {
    match config.preset()? {
        ModemPreset::Named(name) => {
            let values = config.preset_values(&name)?;
            debug!("applying preset {} ({} values)", name, values.len());
            for (address, value) in register_writes(&values) {
                driver.write_register(address, value)?;
            }
        }
        ModemPreset::Structured(preset) => {
            debug!("applying structured preset {:?}", preset);
            driver.apply_preset(&preset)?;
        }
    }

    if let Some(key) = config.encryption_key()? {
        debug!("enabling encryption");
        driver.set_encryption_key(&key)?;
    }

    Ok(())
}
