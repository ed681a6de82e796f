//! Core data types for packets crossing the session boundary

use serde::{Deserialize, Serialize};
use std::fmt;

/// Destination of an outbound frame on the addressed driver variant.
///
/// Peers address each other by numeric node id; some callers on the bus use
/// symbolic names instead, which the driver resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Node(u64),
    Name(String),
}

impl Identifier {
    /// An identifier that carries no destination (`0` or `""`).
    pub fn is_empty(&self) -> bool {
        match self {
            Identifier::Node(id) => *id == 0,
            Identifier::Name(name) => name.is_empty(),
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Node(id) => write!(f, "{}", id),
            Identifier::Name(name) => write!(f, "{}", name),
        }
    }
}

/// Outbound frame handed to the driver
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundPacket {
    /// Present only for the addressed driver variant
    pub identifier: Option<Identifier>,
    pub payload: Vec<u8>,
}

/// Frame read back from the driver after a successful receive.
///
/// Serializes to the wire mapping `{SENDERID?, DATA, RSSI}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundPacket {
    #[serde(rename = "SENDERID", default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<u16>,
    #[serde(rename = "DATA")]
    pub data: Vec<u8>,
    #[serde(rename = "RSSI")]
    pub rssi: i16,
}

impl InboundPacket {
    pub fn new(data: Vec<u8>, rssi: i16) -> Self {
        Self {
            sender_id: None,
            data,
            rssi,
        }
    }

    pub fn with_sender(mut self, sender_id: u16) -> Self {
        self.sender_id = Some(sender_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identifier_emptiness() {
        assert!(Identifier::Node(0).is_empty());
        assert!(Identifier::Name(String::new()).is_empty());
        assert!(!Identifier::Node(2).is_empty());
        assert!(!Identifier::Name("A".to_string()).is_empty());
    }

    #[test]
    fn test_identifier_from_wire() {
        let node: Identifier = serde_json::from_value(json!(7)).unwrap();
        assert_eq!(node, Identifier::Node(7));
        let name: Identifier = serde_json::from_value(json!("A")).unwrap();
        assert_eq!(name, Identifier::Name("A".to_string()));
    }

    #[test]
    fn test_inbound_packet_wire_shape() {
        let addressed = InboundPacket::new(vec![1, 2], -30).with_sender(99);
        assert_eq!(
            serde_json::to_value(&addressed).unwrap(),
            json!({"SENDERID": 99, "DATA": [1, 2], "RSSI": -30})
        );

        let unaddressed = InboundPacket::new(vec![3], -45);
        assert_eq!(
            serde_json::to_value(&unaddressed).unwrap(),
            json!({"DATA": [3], "RSSI": -45})
        );
    }
}
