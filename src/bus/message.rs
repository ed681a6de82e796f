//! Request and response envelopes exchanged over the bus socket
//!
//! One JSON document per line in each direction:
//!
//! ```text
//! -> {"method": "Send", "args": {"ID": 2, "DATA": [1, 2, 3]}}
//! <- {"return": null}
//! -> {"method": "Receive"}
//! <- {"error": {"name": "org.agile-rfm69.IOError", "message": "Module is not connected."}}
//! ```

use crate::api::SessionError;
use crate::bus::BusError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::io::{BufRead, Write};

/// A method call on the protocol interface
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    #[serde(default)]
    pub args: Value,
}

/// Outcome of a method call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Response {
    Return(Value),
    Error(RemoteError),
}

/// Failure as seen by the caller: symbolic name plus readable message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteError {
    pub name: String,
    pub message: String,
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

impl std::error::Error for RemoteError {}

impl From<&SessionError> for RemoteError {
    fn from(error: &SessionError) -> Self {
        Self {
            name: error.symbolic_name(),
            message: error.to_string(),
        }
    }
}

impl From<&BusError> for RemoteError {
    fn from(error: &BusError) -> Self {
        match error {
            BusError::Remote(remote) => remote.clone(),
            other => Self {
                name: other.symbolic_name(),
                message: other.to_string(),
            },
        }
    }
}

impl Request {
    pub fn new(method: impl Into<String>, args: Value) -> Self {
        Self {
            method: method.into(),
            args,
        }
    }
}

impl Response {
    pub fn unit() -> Self {
        Response::Return(Value::Null)
    }

    pub fn session_error(error: &SessionError) -> Self {
        Response::Error(error.into())
    }

    pub fn bus_error(error: &BusError) -> Self {
        Response::Error(error.into())
    }
}

/// Write one message followed by a newline
pub fn write_message<W: Write, T: Serialize>(writer: &mut W, message: &T) -> Result<(), BusError> {
    serde_json::to_writer(&mut *writer, message)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Read the next non-empty line as a message; `Ok(None)` at end of stream.
pub fn read_message<R: BufRead, T: for<'de> Deserialize<'de>>(reader: &mut R) -> Result<Option<T>, BusError> {
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if !line.trim().is_empty() {
            return Ok(Some(serde_json::from_str(line.trim())?));
        }
    }
}
