//! Service constants and modem parameters

/// Name returned by the `Name` operation
pub const PROTOCOL_NAME: &str = "RFM69";

/// Object path the protocol is exported under
pub const PROTOCOL_PATH: &str = "/iot/agile/protocol/RFM69";

/// Well-known bus name requested by the service
pub const BUS_NAME: &str = "iot.agile.protocol.RFM69";

/// Interface implemented by every protocol service on the bus
pub const PROTOCOL_INTERFACE: &str = "iot.agile.Protocol";

/// Literal returned by the `Driver` operation
pub const DRIVER_NAME: &str = "No driver.";

/// Default location of the bus socket
pub const DEFAULT_SOCKET_PATH: &str = "/tmp/rfm69.sock";

/// Prefix of every symbolic error name crossing the bus
pub const ERROR_NAMESPACE: &str = "org.agile-rfm69";

/// Registers written from a table preset, paired positionally with its values:
/// DataModul, BitrateMsb, BitrateLsb, FdevMsb, FdevLsb, RxBw, AfcBw, PacketConfig1.
pub const MODEM_REGISTERS: [u8; 8] = [0x02, 0x03, 0x04, 0x05, 0x06, 0x19, 0x1a, 0x37];

/// Receive-done poll interval (milliseconds)
pub const RECEIVE_POLL_INTERVAL_MS: u64 = 50;

/// Total receive wait before an empty result is returned (milliseconds)
pub const RECEIVE_TIMEOUT_MS: u64 = 5000;

/// Network id used when Setup does not name a channel
pub const DEFAULT_CHANNEL: u8 = 100;

/// Preset selected when Setup does not name one
pub const DEFAULT_MODEM_CONFIG: &str = "GFSK_Rb250Fd250";

/// DataModul value for packet mode FSK without shaping
pub const CONFIG_FSK: u8 = 0x00;

/// DataModul value for packet mode FSK with Gaussian BT=1.0 shaping
pub const CONFIG_GFSK: u8 = 0x01;

/// PacketConfig1: variable length, whitening, CRC on, no address filtering
pub const CONFIG_WHITE: u8 = 0xd0;

/// Bitrate, deviation and bandwidth register values per named rate,
/// in the order BitrateMsb, BitrateLsb, FdevMsb, FdevLsb, RxBw, AfcBw.
pub const MODEM_RATES: [(&str, [u8; 6]); 10] = [
    ("Rb2Fd5", [0x3e, 0x80, 0x00, 0x52, 0xf4, 0xf4]),
    ("Rb2_4Fd4_8", [0x34, 0x15, 0x00, 0x4f, 0xf4, 0xf4]),
    ("Rb4_8Fd9_6", [0x1a, 0x0b, 0x00, 0x9d, 0xf4, 0xf4]),
    ("Rb9_6Fd19_2", [0x0d, 0x05, 0x01, 0x3b, 0xf4, 0xf4]),
    ("Rb19_2Fd38_4", [0x06, 0x83, 0x02, 0x75, 0xf3, 0xf3]),
    ("Rb38_4Fd76_8", [0x03, 0x41, 0x04, 0xea, 0xf2, 0xf2]),
    ("Rb57_6Fd120", [0x02, 0x2c, 0x07, 0xae, 0xe2, 0xe2]),
    ("Rb125Fd125", [0x01, 0x00, 0x08, 0x00, 0xe1, 0xe1]),
    ("Rb250Fd250", [0x00, 0x80, 0x10, 0x00, 0xe0, 0xe0]),
    ("Rb55555Fd50", [0x02, 0x40, 0x03, 0x33, 0x42, 0x42]),
];

/// Wire keys of the Setup mapping
pub mod setup_keys {
    pub const CONFIG_TABLE: &str = "MODEM_CONFIG_TABLE";
    pub const ACTIVE_PRESET: &str = "MODEM_CONFIG";
    pub const ENCRYPTION_KEY: &str = "key";
    pub const CHANNEL: &str = "channel";
}

/// Wire keys of the Send mapping
pub mod send_keys {
    pub const IDENTIFIER: &str = "ID";
    pub const PAYLOAD: &str = "DATA";
}
