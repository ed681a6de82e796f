//! Radio driver error types

use crate::core::ERROR_NAMESPACE;
use crate::hardware::DriverVariant;
use thiserror::Error;

/// Failures raised by a radio driver.
///
/// The session never translates these; they cross the bus as
/// `org.agile-rfm69.DriverError` carrying the display text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DriverError {
    /// The module did not answer on its SPI device
    #[error("Radio not responding on SPI bus {bus} device {device}")]
    NotResponding { bus: u8, device: u8 },
    /// A register write was rejected
    #[error("Write to register 0x{address:02X} failed")]
    RegisterWrite { address: u8 },
    /// Frame larger than the module FIFO allows
    #[error("Payload of {len} bytes exceeds the {max} byte frame limit")]
    PayloadTooLarge { len: usize, max: usize },
    /// Encryption keys must be exactly one AES block
    #[error("Encryption key must be 16 bytes, got {len}")]
    InvalidKey { len: usize },
    /// Operation belongs to the other driver variant
    #[error("{operation} is not supported by the {variant} driver")]
    Unsupported {
        operation: &'static str,
        variant: DriverVariant,
    },
    /// Anything else reported by the hardware
    #[error("Hardware error {code}: {description}")]
    Hardware { code: u32, description: String },
}

impl DriverError {
    /// Stable identifier used when the error crosses the bus
    pub fn symbolic_name(&self) -> String {
        format!("{}.DriverError", ERROR_NAMESPACE)
    }
}

/// Result type for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = DriverError::RegisterWrite { address: 0x1a };
        assert_eq!(err.to_string(), "Write to register 0x1A failed");

        let err = DriverError::Unsupported {
            operation: "wait_for_packet",
            variant: DriverVariant::Register,
        };
        assert_eq!(
            err.to_string(),
            "wait_for_packet is not supported by the register driver"
        );
    }

    #[test]
    fn test_symbolic_name() {
        let err = DriverError::InvalidKey { len: 3 };
        assert_eq!(err.symbolic_name(), "org.agile-rfm69.DriverError");
    }
}
