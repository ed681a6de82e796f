//! Hardware abstraction layer for the RFM69 module
//!
//! The session talks to the radio only through [`RadioDriver`]. Concrete
//! drivers are built by a [`DriverFactory`] from the fixed
//! [`RadioParameters`] of the board plus the network id chosen at Connect.

pub mod driver;
pub mod mock;
pub mod error;

pub use driver::{DriverFactory, DriverVariant, RadioDriver, ReceiveMode, StructuredPreset};
pub use mock::{MockCall, MockProbe, MockRadio, MockRadioFactory, MockStep};
pub use error::{DriverError, DriverResult};

use serde::{Deserialize, Serialize};

/// ISM band the module is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FrequencyBand {
    #[serde(rename = "315")]
    Mhz315,
    #[serde(rename = "433")]
    Mhz433,
    #[serde(rename = "868")]
    Mhz868,
    #[serde(rename = "915")]
    Mhz915,
}

impl FrequencyBand {
    pub fn mhz(&self) -> u32 {
        match self {
            FrequencyBand::Mhz315 => 315,
            FrequencyBand::Mhz433 => 433,
            FrequencyBand::Mhz868 => 868,
            FrequencyBand::Mhz915 => 915,
        }
    }
}

/// Physical and addressing parameters used to construct a driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioParameters {
    /// Which driver variant to build
    pub driver: DriverVariant,
    pub frequency_band: FrequencyBand,
    /// Our own node address
    pub node_id: u8,
    /// Network id; overwritten with the active channel on every Connect
    pub network_id: u8,
    /// RFM69HW/HCW high-power module
    pub high_power: bool,
    /// GPIO wired to DIO0
    pub interrupt_pin: u8,
    /// GPIO wired to RESET
    pub reset_pin: u8,
    pub spi_bus: u8,
    pub spi_device: u8,
    /// Answer every receive with a canned bench frame
    pub simulate_traffic: bool,
}

impl Default for RadioParameters {
    fn default() -> Self {
        Self {
            driver: DriverVariant::Register,
            frequency_band: FrequencyBand::Mhz868,
            node_id: 1,
            network_id: crate::core::DEFAULT_CHANNEL,
            high_power: true,
            interrupt_pin: 18,
            reset_pin: 22,
            spi_bus: 0,
            spi_device: 0,
            simulate_traffic: false,
        }
    }
}

impl RadioParameters {
    /// Copy of these parameters joined to the given network
    pub fn on_channel(&self, channel: u8) -> Self {
        Self {
            network_id: channel,
            ..self.clone()
        }
    }
}
