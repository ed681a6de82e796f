//! Radio driver capability trait and the settings handed to it

use crate::core::{Identifier, InboundPacket};
use crate::hardware::{DriverError, DriverResult, RadioParameters};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Capability set of an RFM69 driver.
///
/// The session is written once against this trait. The two driver variants
/// differ in addressing and in how a receive is awaited; operations that only
/// make sense for the other variant default to [`DriverError::Unsupported`].
pub trait RadioDriver {
    /// Which variant this driver implements
    fn variant(&self) -> DriverVariant;

    /// Calibration and power-mode setup performed right after construction
    fn calibrate(&mut self) -> DriverResult<()>;

    /// Read the die temperature (degrees Celsius, uncalibrated)
    fn read_temperature(&mut self) -> DriverResult<i16>;

    /// Write a single register
    fn write_register(&mut self, address: u8, value: u8) -> DriverResult<()>;

    /// Apply a structured preset as a whole
    fn apply_preset(&mut self, preset: &StructuredPreset) -> DriverResult<()>;

    /// Enable AES encryption with the given key
    fn set_encryption_key(&mut self, key: &[u8]) -> DriverResult<()>;

    /// Dump every register as `(address, value)` pairs
    fn read_all_registers(&mut self) -> DriverResult<Vec<(u8, u8)>>;

    /// Transmit a frame. `identifier` is `None` on the preset variant.
    fn send(&mut self, identifier: Option<&Identifier>, payload: &[u8]) -> DriverResult<()>;

    /// Put the module in receive mode (polling variant)
    fn begin_receive(&mut self) -> DriverResult<()> {
        Err(self.unsupported("begin_receive"))
    }

    /// Whether a frame has arrived since `begin_receive` (polling variant)
    fn receive_done(&mut self) -> DriverResult<bool> {
        Err(self.unsupported("receive_done"))
    }

    /// Sender, payload and RSSI of the last received frame (polling variant)
    fn last_packet(&mut self) -> DriverResult<InboundPacket> {
        Err(self.unsupported("last_packet"))
    }

    /// Block until a frame arrives or `timeout` passes (blocking variant)
    fn wait_for_packet(&mut self, timeout: Duration) -> DriverResult<Option<InboundPacket>> {
        let _ = timeout;
        Err(self.unsupported("wait_for_packet"))
    }

    /// Put the module to sleep and release the hardware
    fn shutdown(&mut self) -> DriverResult<()>;

    #[doc(hidden)]
    fn unsupported(&self, operation: &'static str) -> DriverError {
        DriverError::Unsupported {
            operation,
            variant: self.variant(),
        }
    }
}

/// Builds a fresh driver for every Connect
pub trait DriverFactory {
    fn create(&mut self, params: &RadioParameters) -> DriverResult<Box<dyn RadioDriver>>;
}

impl<F> DriverFactory for F
where
    F: FnMut(&RadioParameters) -> DriverResult<Box<dyn RadioDriver>>,
{
    fn create(&mut self, params: &RadioParameters) -> DriverResult<Box<dyn RadioDriver>> {
        self(params)
    }
}

/// The two driver shapes found in the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriverVariant {
    /// Register-table driver: addressed frames, receive by polling
    Register,
    /// Structured-configuration driver: unaddressed frames, blocking receive
    Preset,
}

/// How the session waits for a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveMode {
    /// Session polls `receive_done` until a deadline
    Polling,
    /// Driver blocks in `wait_for_packet`
    Blocking,
}

impl DriverVariant {
    pub fn requires_identifier(&self) -> bool {
        matches!(self, DriverVariant::Register)
    }

    pub fn receive_mode(&self) -> ReceiveMode {
        match self {
            DriverVariant::Register => ReceiveMode::Polling,
            DriverVariant::Preset => ReceiveMode::Blocking,
        }
    }
}

impl fmt::Display for DriverVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverVariant::Register => write!(f, "register"),
            DriverVariant::Preset => write!(f, "preset"),
        }
    }
}

/// Modem settings applied as one unit by the preset driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StructuredPreset {
    /// Named modulation, e.g. `GFSK_Rb250Fd250`
    pub modulation: String,
    /// Carrier frequency in MHz
    pub frequency_mhz: u32,
    /// Transmit power in dBm
    pub tx_power: i8,
    /// Preamble length in bytes
    pub preamble_length: u16,
    /// Sync words, 1 to 8 bytes
    pub sync_words: Vec<u8>,
}

impl Default for StructuredPreset {
    fn default() -> Self {
        Self {
            modulation: "GFSK_Rb250Fd250".to_string(),
            frequency_mhz: 868,
            tx_power: 13,
            preamble_length: 4,
            sync_words: vec![0x2d, 0xd4],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    impl RadioDriver for Bare {
        fn variant(&self) -> DriverVariant {
            DriverVariant::Preset
        }
        fn calibrate(&mut self) -> DriverResult<()> {
            Ok(())
        }
        fn read_temperature(&mut self) -> DriverResult<i16> {
            Ok(21)
        }
        fn write_register(&mut self, _address: u8, _value: u8) -> DriverResult<()> {
            Ok(())
        }
        fn apply_preset(&mut self, _preset: &StructuredPreset) -> DriverResult<()> {
            Ok(())
        }
        fn set_encryption_key(&mut self, _key: &[u8]) -> DriverResult<()> {
            Ok(())
        }
        fn read_all_registers(&mut self) -> DriverResult<Vec<(u8, u8)>> {
            Ok(Vec::new())
        }
        fn send(&mut self, _identifier: Option<&Identifier>, _payload: &[u8]) -> DriverResult<()> {
            Ok(())
        }
        fn shutdown(&mut self) -> DriverResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_variant_properties() {
        assert!(DriverVariant::Register.requires_identifier());
        assert!(!DriverVariant::Preset.requires_identifier());
        assert_eq!(DriverVariant::Register.receive_mode(), ReceiveMode::Polling);
        assert_eq!(DriverVariant::Preset.receive_mode(), ReceiveMode::Blocking);
    }

    #[test]
    fn test_unimplemented_receive_hooks_report_unsupported() {
        let mut radio = Bare;
        assert_eq!(
            radio.begin_receive(),
            Err(DriverError::Unsupported {
                operation: "begin_receive",
                variant: DriverVariant::Preset,
            })
        );
        assert!(radio.receive_done().is_err());
        assert!(radio.wait_for_packet(Duration::from_millis(1)).is_err());
    }

    #[test]
    fn test_closure_factory() {
        let mut factory = |_: &RadioParameters| -> DriverResult<Box<dyn RadioDriver>> {
            Ok(Box::new(Bare))
        };
        let radio = factory.create(&RadioParameters::default()).unwrap();
        assert_eq!(radio.variant(), DriverVariant::Preset);
    }

    #[test]
    fn test_structured_preset_rejects_unknown_fields() {
        let parsed: Result<StructuredPreset, _> =
            serde_json::from_value(serde_json::json!({"bogus": 1}));
        assert!(parsed.is_err());

        let parsed: StructuredPreset =
            serde_json::from_value(serde_json::json!({"tx_power": 20})).unwrap();
        assert_eq!(parsed.tx_power, 20);
        assert_eq!(parsed.frequency_mhz, 868);
    }
}
