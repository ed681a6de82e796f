//! Blocking client for the bus socket

use crate::bus::message::{read_message, write_message, Request, Response};
use crate::bus::BusError;
use log::trace;
use serde_json::Value;
use std::io::BufReader;
use std::os::unix::net::UnixStream;
use std::path::Path;

pub struct BusClient {
    writer: UnixStream,
    reader: BufReader<UnixStream>,
}

impl BusClient {
    pub fn connect<P: AsRef<Path>>(path: P) -> Result<Self, BusError> {
        Self::from_stream(UnixStream::connect(path)?)
    }

    pub fn from_stream(stream: UnixStream) -> Result<Self, BusError> {
        let reader = BufReader::new(stream.try_clone()?);
        Ok(Self {
            writer: stream,
            reader,
        })
    }

    /// Invoke `method` and wait for its reply.
    ///
    /// A failure reported by the service comes back as [`BusError::Remote`].
    pub fn call(&mut self, method: &str, args: Value) -> Result<Value, BusError> {
        trace!("-> {} {}", method, args);
        write_message(&mut self.writer, &Request::new(method, args))?;

        match read_message::<_, Response>(&mut self.reader)? {
            Some(Response::Return(value)) => {
                trace!("<- {}", value);
                Ok(value)
            }
            Some(Response::Error(remote)) => Err(BusError::Remote(remote)),
            None => Err(BusError::Closed),
        }
    }
}
