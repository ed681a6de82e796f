//! Decoding of argument mappings delivered by the bus
//!
//! Bytes cross the bus as arrays of small integers; they are repacked into a
//! contiguous buffer here before anything reaches the driver.

use crate::api::types::{SessionError, SessionResult};
use crate::core::{send_keys, Identifier, OutboundPacket};
use crate::hardware::DriverVariant;
use serde_json::{Map, Value};

/// Argument mapping of Setup and Send
pub type Arguments = Map<String, Value>;

/// A value that counts as "not provided": null, false, zero, or empty.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(entries) => entries.is_empty(),
    }
}

/// Repack an array of integers in `0..=255` into bytes.
///
/// Returns `None` when the value is not an array or any element is out of range.
pub fn byte_sequence(value: &Value) -> Option<Vec<u8>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_u64().and_then(|byte| u8::try_from(byte).ok()))
        .collect()
}

/// Build the outbound frame for a Send call.
///
/// Missing or empty fields are checked before the payload shape, so an empty
/// payload is a value error even when it is also the wrong type.
pub fn outbound_packet(args: &Arguments, variant: DriverVariant) -> SessionResult<OutboundPacket> {
    let payload = args.get(send_keys::PAYLOAD).filter(|value| !is_blank(value));
    let identifier = args.get(send_keys::IDENTIFIER).filter(|value| !is_blank(value));

    let payload = match (payload, identifier, variant.requires_identifier()) {
        (Some(payload), Some(_), true) | (Some(payload), _, false) => payload,
        (_, _, true) => {
            return Err(SessionError::Value("You must provide the data and Id.".to_string()));
        }
        (None, _, false) => {
            return Err(SessionError::Value("You must provide the data.".to_string()));
        }
    };

    if !payload.is_array() {
        return Err(SessionError::Type(
            "You must provide the data as a list of values.".to_string(),
        ));
    }
    let payload = byte_sequence(payload).ok_or_else(|| {
        SessionError::Type("Data values must be integers between 0 and 255.".to_string())
    })?;

    let identifier = match identifier {
        Some(value) if variant.requires_identifier() => Some(
            serde_json::from_value::<Identifier>(value.clone()).map_err(|_| {
                SessionError::Type("Id must be a node number or a name.".to_string())
            })?,
        ),
        _ => None,
    };

    Ok(OutboundPacket { identifier, payload })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Arguments {
        match value {
            Value::Object(map) => map,
            _ => panic!("test arguments must be an object"),
        }
    }

    #[test]
    fn test_blank_values() {
        for blank in [json!(null), json!(false), json!(0), json!(""), json!([]), json!({})] {
            assert!(is_blank(&blank), "{} should be blank", blank);
        }
        for present in [json!(true), json!(1), json!("A"), json!([0]), json!({"a": 1})] {
            assert!(!is_blank(&present), "{} should not be blank", present);
        }
    }

    #[test]
    fn test_byte_sequence() {
        assert_eq!(byte_sequence(&json!([0, 1, 255])), Some(vec![0, 1, 255]));
        assert_eq!(byte_sequence(&json!([256])), None);
        assert_eq!(byte_sequence(&json!([-1])), None);
        assert_eq!(byte_sequence(&json!([1.5])), None);
        assert_eq!(byte_sequence(&json!("abc")), None);
    }

    #[test]
    fn test_addressed_packet() {
        let packet = outbound_packet(
            &args(json!({"ID": "A", "DATA": [1, 2, 3]})),
            DriverVariant::Register,
        )
        .unwrap();
        assert_eq!(packet.identifier, Some(Identifier::Name("A".to_string())));
        assert_eq!(packet.payload, vec![1, 2, 3]);

        let packet = outbound_packet(&args(json!({"ID": 2, "DATA": [7]})), DriverVariant::Register)
            .unwrap();
        assert_eq!(packet.identifier, Some(Identifier::Node(2)));
    }

    #[test]
    fn test_unaddressed_packet_ignores_identifier() {
        let packet = outbound_packet(&args(json!({"ID": 4, "DATA": [9]})), DriverVariant::Preset)
            .unwrap();
        assert_eq!(packet.identifier, None);

        let packet = outbound_packet(&args(json!({"DATA": [9]})), DriverVariant::Preset).unwrap();
        assert_eq!(packet.payload, vec![9]);
    }

    #[test]
    fn test_missing_fields_are_value_errors() {
        let cases = [
            (json!({"DATA": [1]}), DriverVariant::Register),
            (json!({"ID": "A"}), DriverVariant::Register),
            (json!({"ID": "A", "DATA": []}), DriverVariant::Register),
            (json!({"ID": "", "DATA": [1]}), DriverVariant::Register),
            (json!({"ID": 0, "DATA": [1]}), DriverVariant::Register),
            (json!({}), DriverVariant::Preset),
            (json!({"DATA": ""}), DriverVariant::Preset),
        ];
        for (value, variant) in cases {
            let result = outbound_packet(&args(value.clone()), variant);
            assert!(
                matches!(result, Err(SessionError::Value(_))),
                "{} on {} gave {:?}",
                value,
                variant,
                result
            );
        }
    }

    #[test]
    fn test_wrong_shapes_are_type_errors() {
        let cases = [
            json!({"ID": "A", "DATA": 5}),
            json!({"ID": "A", "DATA": "hello"}),
            json!({"ID": "A", "DATA": [1, 300]}),
            json!({"ID": [1], "DATA": [1]}),
        ];
        for value in cases {
            let result = outbound_packet(&args(value.clone()), DriverVariant::Register);
            assert!(
                matches!(result, Err(SessionError::Type(_))),
                "{} gave {:?}",
                value,
                result
            );
        }
    }
}
