//! Transport-level errors of the bus

use crate::bus::message::RemoteError;
use crate::core::ERROR_NAMESPACE;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BusError {
    #[error("Unknown method {0}")]
    UnknownMethod(String),

    #[error("Invalid arguments for {method}: {reason}")]
    InvalidArguments { method: String, reason: String },

    #[error("Malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Bus I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Connection closed before a reply arrived")]
    Closed,

    #[error("{0}")]
    Remote(RemoteError),
}

impl BusError {
    /// Stable identifier used when the error is sent back to a caller
    pub fn symbolic_name(&self) -> String {
        let suffix = match self {
            BusError::UnknownMethod(_) => "UnknownMethod",
            BusError::InvalidArguments { .. } | BusError::Malformed(_) => "InvalidArguments",
            BusError::Io(_) | BusError::Closed => "IOError",
            BusError::Remote(remote) => return remote.name.clone(),
        };
        format!("{}.{}", ERROR_NAMESPACE, suffix)
    }
}
