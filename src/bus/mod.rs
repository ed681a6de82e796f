//! Local inter-process bus
//!
//! The protocol interface is served on a Unix socket as newline-delimited
//! JSON. [`Dispatcher`] maps method names to session operations,
//! [`BusServer`] accepts callers and [`BusClient`] is the calling side.

pub mod client;
pub mod dispatch;
pub mod error;
pub mod message;
pub mod server;

pub use client::BusClient;
pub use dispatch::{Dispatcher, Method};
pub use error::BusError;
pub use message::{RemoteError, Request, Response};
pub use server::{serve_connection, BusServer};
