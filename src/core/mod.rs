//! Core types and constants shared by the radio, session and bus layers

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
