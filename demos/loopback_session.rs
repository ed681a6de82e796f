//! Session walkthrough against the simulated radio
//!
//! Runs the same calls a bus client would make, directly on a session,
//! once for each driver variant.

use rfm69_bus::core::InboundPacket;
use rfm69_bus::hardware::{DriverVariant, MockRadioFactory, MockStep};
use rfm69_bus::{Session, ServiceConfig};
use serde_json::{json, Value};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== RFM69 Bus - Loopback Session Demo ===\n");

    demo_register_radio()?;
    demo_preset_radio()?;

    println!("\n=== Demo Complete ===");
    Ok(())
}

fn arguments(value: Value) -> rfm69_bus::Arguments {
    value.as_object().cloned().unwrap_or_default()
}

fn demo_register_radio() -> Result<(), Box<dyn std::error::Error>> {
    println!("1. Register driver:");

    let mut config = ServiceConfig::default();
    config.receive.timeout_ms = 500;
    let factory = MockRadioFactory::new();
    let probe = factory.probe();
    let mut session = Session::new(&config, Box::new(factory));

    session.setup(&arguments(json!({
        "MODEM_CONFIG": "FSK_Rb2Fd5",
        "key": "sampleEncryptKey",
        "channel": 20,
    })));
    session.connect()?;
    println!("   Connected: {}", session.is_connected());
    println!("   Modem registers written: {}", probe.count(MockStep::WriteRegister));

    session.send(&arguments(json!({"ID": 2, "DATA": [0x48, 0x69]})))?;
    println!("   Frames sent: {:?}", probe.sent_frames());

    probe.queue_packet(InboundPacket::new(b"pong".to_vec(), -52).with_sender(2));
    match session.receive()? {
        Some(packet) => println!("   Received: {}", serde_json::to_string(&packet)?),
        None => println!("   Nothing received"),
    }

    match session.receive()? {
        Some(packet) => println!("   Received: {}", serde_json::to_string(&packet)?),
        None => println!("   Second receive timed out"),
    }

    if let Err(e) = session.connect() {
        println!("   Connect while connected: {} ({})", e, e.symbolic_name());
    }

    session.disconnect()?;
    println!("   Connected after disconnect: {}", session.is_connected());
    Ok(())
}

fn demo_preset_radio() -> Result<(), Box<dyn std::error::Error>> {
    println!("\n2. Preset driver with simulated traffic:");

    let mut config = ServiceConfig::default();
    config.radio.driver = DriverVariant::Preset;
    config.radio.simulate_traffic = true;
    config.receive.timeout_ms = 500;
    let mut session = Session::new(&config, Box::new(MockRadioFactory::new()));

    session.setup(&arguments(json!({"MODEM_CONFIG": {"modulation": "GFSK_Rb250Fd250"}})));
    session.connect()?;

    match session.receive()? {
        Some(packet) => println!("   Bench frame: {}", serde_json::to_string(&packet)?),
        None => println!("   Nothing received"),
    }

    if let Err(e) = session.send(&arguments(json!({"DATA": "not bytes"}))) {
        println!("   Send with text payload: {} ({})", e, e.symbolic_name());
    }

    session.disconnect()?;
    Ok(())
}
