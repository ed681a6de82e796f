//! Routing bus requests to session operations

use crate::api::{Arguments, Session, SessionResult};
use crate::bus::message::{Request, Response};
use crate::bus::BusError;
use log::{debug, warn};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Methods of the protocol interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Connect,
    Connected,
    Disconnect,
    Setup,
    Send,
    Receive,
    Name,
    Driver,
    Discover,
    Exec,
    Subscribe,
}

impl Method {
    pub const ALL: [Method; 11] = [
        Method::Connect,
        Method::Connected,
        Method::Disconnect,
        Method::Setup,
        Method::Send,
        Method::Receive,
        Method::Name,
        Method::Driver,
        Method::Discover,
        Method::Exec,
        Method::Subscribe,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Connect => "Connect",
            Method::Connected => "Connected",
            Method::Disconnect => "Disconnect",
            Method::Setup => "Setup",
            Method::Send => "Send",
            Method::Receive => "Receive",
            Method::Name => "Name",
            Method::Driver => "Driver",
            Method::Discover => "Discover",
            Method::Exec => "Exec",
            Method::Subscribe => "Subscribe",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = BusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Method::ALL
            .iter()
            .copied()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| BusError::UnknownMethod(s.to_string()))
    }
}

/// Owns the session and answers one request at a time
pub struct Dispatcher {
    session: Session,
}

impl Dispatcher {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    /// Run one request against the session
    pub fn dispatch(&mut self, request: &Request) -> Response {
        debug!("dispatching {}", request.method);
        let response = match request.method.parse::<Method>() {
            Ok(method) => self.invoke(method, &request.args),
            Err(error) => Err(error),
        };

        match response {
            Ok(response) => response,
            Err(error) => {
                warn!("{} rejected: {}", request.method, error);
                Response::bus_error(&error)
            }
        }
    }

    fn invoke(&mut self, method: Method, args: &Value) -> Result<Response, BusError> {
        let session = &mut self.session;
        let response = match method {
            Method::Connect => reply_unit(session.connect()),
            Method::Connected => Response::Return(Value::Bool(session.is_connected())),
            Method::Disconnect => reply_unit(session.disconnect()),
            Method::Setup => {
                session.setup(&mapping(method, args)?);
                Response::unit()
            }
            Method::Send => reply_unit(session.send(&mapping(method, args)?)),
            Method::Receive => match session.receive() {
                Ok(Some(packet)) => Response::Return(serde_json::to_value(packet)?),
                Ok(None) => Response::Return(Value::Object(Map::new())),
                Err(error) => Response::session_error(&error),
            },
            Method::Name => Response::Return(Value::String(session.name().to_string())),
            Method::Driver => Response::Return(Value::String(session.driver_name().to_string())),
            Method::Discover => match session.discover(args) {
                Ok(value) => Response::Return(value),
                Err(error) => Response::session_error(&error),
            },
            Method::Exec => reply_unit(session.exec(args)),
            Method::Subscribe => reply_unit(session.subscribe(args)),
        };
        Ok(response)
    }
}

fn reply_unit(result: SessionResult<()>) -> Response {
    match result {
        Ok(()) => Response::unit(),
        Err(error) => Response::session_error(&error),
    }
}

/// Setup and Send take a string-keyed mapping; a missing one is empty.
fn mapping(method: Method, args: &Value) -> Result<Arguments, BusError> {
    match args {
        Value::Null => Ok(Arguments::new()),
        Value::Object(map) => Ok(map.clone()),
        other => Err(BusError::InvalidArguments {
            method: method.to_string(),
            reason: format!("expected a mapping, got {}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::message::RemoteError;
    use crate::hardware::{DriverVariant, MockProbe, MockRadioFactory};
    use crate::utils::ServiceConfig;
    use crate::core::InboundPacket;
    use serde_json::json;

    fn dispatcher(variant: DriverVariant) -> (Dispatcher, MockProbe) {
        let mut config = ServiceConfig::default();
        config.radio.driver = variant;
        config.receive.timeout_ms = 40;
        config.receive.poll_interval_ms = 5;
        let factory = MockRadioFactory::new();
        let probe = factory.probe();
        (Dispatcher::new(Session::new(&config, Box::new(factory))), probe)
    }

    fn call(dispatcher: &mut Dispatcher, method: &str, args: Value) -> Response {
        dispatcher.dispatch(&Request::new(method, args))
    }

    fn error_name(response: Response) -> String {
        match response {
            Response::Error(RemoteError { name, .. }) => name,
            other => panic!("expected an error, got {:?}", other),
        }
    }

    #[test]
    fn test_method_names() {
        for method in Method::ALL {
            assert_eq!(method.as_str().parse::<Method>().unwrap(), method);
        }
        assert!(matches!("connect".parse::<Method>(), Err(BusError::UnknownMethod(_))));
    }

    #[test]
    fn test_identity_methods() {
        let (mut dispatcher, _) = dispatcher(DriverVariant::Register);
        assert_eq!(call(&mut dispatcher, "Name", Value::Null), Response::Return(json!("RFM69")));
        assert_eq!(call(&mut dispatcher, "Driver", Value::Null), Response::Return(json!("No driver.")));
        assert_eq!(call(&mut dispatcher, "Connected", Value::Null), Response::Return(json!(false)));
    }

    #[test]
    fn test_connect_send_receive() {
        let (mut dispatcher, probe) = dispatcher(DriverVariant::Register);
        assert_eq!(call(&mut dispatcher, "Connect", Value::Null), Response::unit());
        assert_eq!(call(&mut dispatcher, "Connected", Value::Null), Response::Return(json!(true)));

        let sent = call(&mut dispatcher, "Send", json!({"ID": 2, "DATA": [1, 2, 3]}));
        assert_eq!(sent, Response::unit());
        assert_eq!(probe.sent_frames().len(), 1);

        probe.queue_packet(InboundPacket::new(vec![9, 8], -40).with_sender(5));
        assert_eq!(
            call(&mut dispatcher, "Receive", Value::Null),
            Response::Return(json!({"SENDERID": 5, "DATA": [9, 8], "RSSI": -40}))
        );
    }

    #[test]
    fn test_receive_timeout_returns_empty_mapping() {
        let (mut dispatcher, _) = dispatcher(DriverVariant::Register);
        call(&mut dispatcher, "Connect", Value::Null);
        assert_eq!(call(&mut dispatcher, "Receive", Value::Null), Response::Return(json!({})));
    }

    #[test]
    fn test_session_errors_carry_symbolic_names() {
        let (mut dispatcher, _) = dispatcher(DriverVariant::Register);
        assert_eq!(
            error_name(call(&mut dispatcher, "Disconnect", Value::Null)),
            "org.agile-rfm69.IOError"
        );

        call(&mut dispatcher, "Connect", Value::Null);
        assert_eq!(
            error_name(call(&mut dispatcher, "Send", json!({"ID": 2}))),
            "org.agile-rfm69.ValueError"
        );
        assert_eq!(
            error_name(call(&mut dispatcher, "Send", json!({"ID": 2, "DATA": "abc"}))),
            "org.agile-rfm69.TypeError"
        );
        assert_eq!(
            error_name(call(&mut dispatcher, "Exec", json!(["reset", {}]))),
            "org.agile-rfm69.NotImplemented"
        );
    }

    #[test]
    fn test_setup_stores_configuration() {
        let (mut dispatcher, _) = dispatcher(DriverVariant::Register);
        assert_eq!(call(&mut dispatcher, "Setup", json!({"channel": 9})), Response::unit());
        assert_eq!(dispatcher.session().configuration().channel, json!(9));
        assert!(!dispatcher.session().is_connected());
    }

    #[test]
    fn test_bus_level_errors() {
        let (mut dispatcher, _) = dispatcher(DriverVariant::Register);
        assert_eq!(
            error_name(call(&mut dispatcher, "Reboot", Value::Null)),
            "org.agile-rfm69.UnknownMethod"
        );
        assert_eq!(
            error_name(call(&mut dispatcher, "Setup", json!([1, 2]))),
            "org.agile-rfm69.InvalidArguments"
        );
    }
}
