//! RFM69 radio session adapter
//!
//! Exposes an RFM69 packet radio as a protocol service on a local
//! inter-process bus. Callers connect, configure, send and receive through
//! a single [`api::Session`], which drives the radio through the
//! [`hardware::RadioDriver`] capability.

pub mod api;
pub mod bus;
pub mod core;
pub mod hardware;
pub mod utils;

// Re-export commonly used types
pub use api::{Arguments, Configuration, ErrorKind, Session, SessionError, SessionResult};
pub use bus::{BusClient, BusError, BusServer, Dispatcher};
pub use core::{Identifier, InboundPacket, OutboundPacket};
pub use hardware::{DriverError, DriverFactory, DriverVariant, MockRadioFactory, RadioDriver, RadioParameters};
pub use utils::{ConfigError, ServiceConfig};
