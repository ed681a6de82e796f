//! Session adapter exposed to the bus
//!
//! The session owns connection state and the active configuration and
//! drives the radio through [`crate::hardware::RadioDriver`]. Argument
//! decoding and the bounded receive wait live in their own modules.

pub mod args;
pub mod configuration;
pub mod modem;
pub mod session;
pub mod types;
pub mod wait;

pub use args::Arguments;
pub use configuration::{Configuration, ModemPreset};
pub use session::Session;
pub use types::{ErrorKind, SessionError, SessionResult};
pub use wait::{BoundedWait, WaitOutcome};
