//! Unix socket server exposing the protocol interface
//!
//! Connections are served one after another. Calls from every client
//! therefore reach the session strictly in arrival order.

use crate::bus::dispatch::Dispatcher;
use crate::bus::message::{read_message, write_message, Request, Response};
use crate::bus::BusError;
use log::{debug, info, warn};
use std::fs;
use std::io::BufReader;
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};

pub struct BusServer {
    listener: UnixListener,
    path: PathBuf,
}

impl BusServer {
    /// Listen on `path`, replacing a socket left behind by an earlier run.
    pub fn bind<P: AsRef<Path>>(path: P) -> Result<Self, BusError> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            debug!("removing stale socket {}", path.display());
            fs::remove_file(&path)?;
        }
        let listener = UnixListener::bind(&path)?;
        info!("listening on {}", path.display());
        Ok(Self { listener, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Accept clients until the listener fails
    pub fn serve(&self, dispatcher: &mut Dispatcher) -> Result<(), BusError> {
        for stream in self.listener.incoming() {
            let stream = stream?;
            if let Err(e) = serve_connection(&stream, dispatcher) {
                warn!("client dropped: {}", e);
            }
        }
        Ok(())
    }
}

impl Drop for BusServer {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            debug!("could not remove {}: {}", self.path.display(), e);
        }
    }
}

/// Answer requests on one stream until the peer closes it.
///
/// A line that does not parse is answered with an error and the
/// connection stays open.
pub fn serve_connection(stream: &UnixStream, dispatcher: &mut Dispatcher) -> Result<(), BusError> {
    let mut reader = BufReader::new(stream);
    let mut writer = stream;
    debug!("client connected");

    loop {
        let response = match read_message::<_, Request>(&mut reader) {
            Ok(Some(request)) => dispatcher.dispatch(&request),
            Ok(None) => break,
            Err(error @ BusError::Malformed(_)) => {
                warn!("unreadable request: {}", error);
                Response::bus_error(&error)
            }
            Err(error) => return Err(error),
        };
        write_message(&mut writer, &response)?;
    }

    debug!("client disconnected");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Session;
    use crate::bus::client::BusClient;
    use crate::hardware::MockRadioFactory;
    use crate::utils::ServiceConfig;
    use serde_json::{json, Value};
    use std::io::{BufRead, Write};
    use std::thread;

    fn dispatcher() -> Dispatcher {
        let mut config = ServiceConfig::default();
        config.receive.timeout_ms = 40;
        config.receive.poll_interval_ms = 5;
        Dispatcher::new(Session::new(&config, Box::new(MockRadioFactory::new())))
    }

    #[test]
    fn test_client_session_over_stream_pair() {
        let (server_end, client_end) = UnixStream::pair().unwrap();

        let client = thread::spawn(move || {
            let mut client = BusClient::from_stream(client_end).unwrap();
            let name = client.call("Name", Value::Null).unwrap();
            client.call("Connect", Value::Null).unwrap();
            let connected = client.call("Connected", Value::Null).unwrap();
            let again = client.call("Connect", Value::Null);
            client.call("Send", json!({"ID": 3, "DATA": [0x41]})).unwrap();
            let received = client.call("Receive", Value::Null).unwrap();
            client.call("Disconnect", Value::Null).unwrap();
            (name, connected, again, received)
        });

        let mut dispatcher = dispatcher();
        serve_connection(&server_end, &mut dispatcher).unwrap();
        let (name, connected, again, received) = client.join().unwrap();

        assert_eq!(name, json!("RFM69"));
        assert_eq!(connected, json!(true));
        match again {
            Err(BusError::Remote(remote)) => {
                assert_eq!(remote.name, "org.agile-rfm69.IOError");
                assert_eq!(remote.message, "Module is already connected.");
            }
            other => panic!("expected a remote error, got {:?}", other),
        }
        assert_eq!(received, json!({}));
        assert!(!dispatcher.session().is_connected());
    }

    #[test]
    fn test_malformed_line_keeps_connection_open() {
        let (server_end, client_end) = UnixStream::pair().unwrap();

        let client = thread::spawn(move || {
            let mut writer = &client_end;
            writer.write_all(b"this is not json\n{\"method\": \"Name\"}\n").unwrap();
            client_end.shutdown(std::net::Shutdown::Write).unwrap();

            BufReader::new(&client_end)
                .lines()
                .map(|line| serde_json::from_str::<Value>(&line.unwrap()).unwrap())
                .collect::<Vec<_>>()
        });

        let mut dispatcher = dispatcher();
        serve_connection(&server_end, &mut dispatcher).unwrap();
        drop(server_end);
        let replies = client.join().unwrap();

        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0]["error"]["name"], json!("org.agile-rfm69.InvalidArguments"));
        assert_eq!(replies[1], json!({"return": "RFM69"}));
    }

    #[test]
    fn test_bind_replaces_stale_socket() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rfm69.sock");
        fs::write(&path, b"stale").unwrap();

        let server = BusServer::bind(&path).unwrap();
        assert_eq!(server.path(), path.as_path());
        assert!(UnixStream::connect(&path).is_ok());

        drop(server);
        assert!(!path.exists());
    }
}
