//! Mock radio for testing and for running the service without hardware

use crate::core::{Identifier, InboundPacket};
use crate::hardware::{
    DriverError, DriverFactory, DriverResult, DriverVariant, RadioDriver, RadioParameters,
    StructuredPreset,
};
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Largest payload the RFM69 FIFO carries in one frame
pub const MAX_PAYLOAD_LEN: usize = 61;

/// Environment frame the register bench radio answers with
pub const REGISTER_BENCH_FRAME: [u8; 14] = [
    0x00, 0x00, 0x08, 0x34, 0x08, 0x34, 0x64, 0x64, 0x44, 0x5c, 0x00, 0x64, 0x0b, 0xc7,
];

/// Frame the preset bench radio answers with
pub const PRESET_BENCH_FRAME: [u8; 17] = [1, 3, 0, 0, 9, 0, 0, 0, 0, 0, 0, 86, 241, 2, 0, 15, 161];

const BENCH_SENDER_ID: u16 = 99;
const BENCH_RSSI: i16 = -30;
const INJECTED_FAILURE_CODE: u32 = 0xdead;

/// Driver operation, used to script failures and count calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockStep {
    Create,
    Calibrate,
    ReadTemperature,
    WriteRegister,
    ApplyPreset,
    SetEncryptionKey,
    ReadAllRegisters,
    Send,
    BeginReceive,
    ReceiveDone,
    LastPacket,
    WaitForPacket,
    Shutdown,
}

/// One recorded driver call with its arguments
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Create(RadioParameters),
    Calibrate,
    ReadTemperature,
    WriteRegister { address: u8, value: u8 },
    ApplyPreset(StructuredPreset),
    SetEncryptionKey(Vec<u8>),
    ReadAllRegisters,
    Send { identifier: Option<Identifier>, payload: Vec<u8> },
    BeginReceive,
    ReceiveDone,
    LastPacket,
    WaitForPacket(Duration),
    Shutdown,
}

impl MockCall {
    pub fn step(&self) -> MockStep {
        match self {
            MockCall::Create(_) => MockStep::Create,
            MockCall::Calibrate => MockStep::Calibrate,
            MockCall::ReadTemperature => MockStep::ReadTemperature,
            MockCall::WriteRegister { .. } => MockStep::WriteRegister,
            MockCall::ApplyPreset(_) => MockStep::ApplyPreset,
            MockCall::SetEncryptionKey(_) => MockStep::SetEncryptionKey,
            MockCall::ReadAllRegisters => MockStep::ReadAllRegisters,
            MockCall::Send { .. } => MockStep::Send,
            MockCall::BeginReceive => MockStep::BeginReceive,
            MockCall::ReceiveDone => MockStep::ReceiveDone,
            MockCall::LastPacket => MockStep::LastPacket,
            MockCall::WaitForPacket(_) => MockStep::WaitForPacket,
            MockCall::Shutdown => MockStep::Shutdown,
        }
    }
}

#[derive(Debug)]
struct MockState {
    calls: Vec<MockCall>,
    failures: HashSet<MockStep>,
    inbox: VecDeque<InboundPacket>,
    registers: BTreeMap<u8, u8>,
    temperature: i16,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            failures: HashSet::new(),
            inbox: VecDeque::new(),
            registers: BTreeMap::new(),
            temperature: 21,
        }
    }
}

/// Shared view into every radio built by a [`MockRadioFactory`].
///
/// Clones observe and script the same state, so a test keeps one probe while
/// the session owns the radios.
#[derive(Debug, Clone, Default)]
pub struct MockProbe {
    state: Arc<Mutex<MockState>>,
}

impl MockProbe {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a call, failing it if the step was scripted to fail
    fn record(&self, call: MockCall) -> DriverResult<()> {
        let mut state = self.lock();
        let step = call.step();
        state.calls.push(call);
        if state.failures.contains(&step) {
            return Err(DriverError::Hardware {
                code: INJECTED_FAILURE_CODE,
                description: format!("injected {:?} failure", step),
            });
        }
        Ok(())
    }

    /// Queue a frame to be delivered by the next receive
    pub fn queue_packet(&self, packet: InboundPacket) {
        self.lock().inbox.push_back(packet);
    }

    /// Make every call of `step` fail until cleared
    pub fn fail_on(&self, step: MockStep) {
        self.lock().failures.insert(step);
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    pub fn set_temperature(&self, celsius: i16) {
        self.lock().temperature = celsius;
    }

    /// All calls recorded so far, oldest first
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Number of recorded calls of one kind
    pub fn count(&self, step: MockStep) -> usize {
        self.lock().calls.iter().filter(|call| call.step() == step).count()
    }

    /// Register writes in the order they happened
    pub fn written_registers(&self) -> Vec<(u8, u8)> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                MockCall::WriteRegister { address, value } => Some((*address, *value)),
                _ => None,
            })
            .collect()
    }

    /// Frames handed to `send`, in order
    pub fn sent_frames(&self) -> Vec<(Option<Identifier>, Vec<u8>)> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                MockCall::Send { identifier, payload } => Some((identifier.clone(), payload.clone())),
                _ => None,
            })
            .collect()
    }

    fn next_inbound(&self) -> Option<InboundPacket> {
        self.lock().inbox.pop_front()
    }
}

/// In-memory RFM69 implementing either driver variant
pub struct MockRadio {
    variant: DriverVariant,
    params: RadioParameters,
    probe: MockProbe,
    canned: Option<InboundPacket>,
    received: Option<InboundPacket>,
    encryption_key: Option<Vec<u8>>,
}

impl MockRadio {
    pub fn new(params: &RadioParameters, probe: MockProbe) -> Self {
        let canned = if params.simulate_traffic {
            Some(Self::bench_frame(params.driver))
        } else {
            None
        };

        Self {
            variant: params.driver,
            params: params.clone(),
            probe,
            canned,
            received: None,
            encryption_key: None,
        }
    }

    /// Canned frame of the bench radio for a variant
    pub fn bench_frame(variant: DriverVariant) -> InboundPacket {
        match variant {
            DriverVariant::Register => {
                InboundPacket::new(REGISTER_BENCH_FRAME.to_vec(), BENCH_RSSI).with_sender(BENCH_SENDER_ID)
            }
            DriverVariant::Preset => InboundPacket::new(PRESET_BENCH_FRAME.to_vec(), BENCH_RSSI),
        }
    }

    pub fn parameters(&self) -> &RadioParameters {
        &self.params
    }

    pub fn is_encrypted(&self) -> bool {
        self.encryption_key.is_some()
    }

    /// Next frame from the queue, falling back to the bench frame
    fn take_inbound(&mut self) -> Option<InboundPacket> {
        let packet = self.probe.next_inbound().or_else(|| self.canned.clone())?;
        Some(match self.variant {
            DriverVariant::Register => packet,
            DriverVariant::Preset => InboundPacket {
                sender_id: None,
                ..packet
            },
        })
    }
}

impl RadioDriver for MockRadio {
    fn variant(&self) -> DriverVariant {
        self.variant
    }

    fn calibrate(&mut self) -> DriverResult<()> {
        self.probe.record(MockCall::Calibrate)
    }

    fn read_temperature(&mut self) -> DriverResult<i16> {
        self.probe.record(MockCall::ReadTemperature)?;
        Ok(self.probe.lock().temperature)
    }

    fn write_register(&mut self, address: u8, value: u8) -> DriverResult<()> {
        self.probe.record(MockCall::WriteRegister { address, value })?;
        self.probe.lock().registers.insert(address, value);
        Ok(())
    }

    fn apply_preset(&mut self, preset: &StructuredPreset) -> DriverResult<()> {
        self.probe.record(MockCall::ApplyPreset(preset.clone()))
    }

    fn set_encryption_key(&mut self, key: &[u8]) -> DriverResult<()> {
        self.probe.record(MockCall::SetEncryptionKey(key.to_vec()))?;
        if key.len() != 16 {
            return Err(DriverError::InvalidKey { len: key.len() });
        }
        self.encryption_key = Some(key.to_vec());
        Ok(())
    }

    fn read_all_registers(&mut self) -> DriverResult<Vec<(u8, u8)>> {
        self.probe.record(MockCall::ReadAllRegisters)?;
        let state = self.probe.lock();
        Ok((0x01..0x50)
            .map(|address| (address, state.registers.get(&address).copied().unwrap_or(0)))
            .collect())
    }

    fn send(&mut self, identifier: Option<&Identifier>, payload: &[u8]) -> DriverResult<()> {
        self.probe.record(MockCall::Send {
            identifier: identifier.cloned(),
            payload: payload.to_vec(),
        })?;
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(DriverError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PAYLOAD_LEN,
            });
        }
        Ok(())
    }

    fn begin_receive(&mut self) -> DriverResult<()> {
        if self.variant != DriverVariant::Register {
            return Err(self.unsupported("begin_receive"));
        }
        self.probe.record(MockCall::BeginReceive)?;
        self.received = None;
        Ok(())
    }

    fn receive_done(&mut self) -> DriverResult<bool> {
        if self.variant != DriverVariant::Register {
            return Err(self.unsupported("receive_done"));
        }
        self.probe.record(MockCall::ReceiveDone)?;
        if self.received.is_none() {
            self.received = self.take_inbound();
        }
        Ok(self.received.is_some())
    }

    fn last_packet(&mut self) -> DriverResult<InboundPacket> {
        if self.variant != DriverVariant::Register {
            return Err(self.unsupported("last_packet"));
        }
        self.probe.record(MockCall::LastPacket)?;
        self.received.clone().ok_or_else(|| DriverError::Hardware {
            code: 0,
            description: "no frame in FIFO".to_string(),
        })
    }

    fn wait_for_packet(&mut self, timeout: Duration) -> DriverResult<Option<InboundPacket>> {
        if self.variant != DriverVariant::Preset {
            return Err(self.unsupported("wait_for_packet"));
        }
        self.probe.record(MockCall::WaitForPacket(timeout))?;
        match self.take_inbound() {
            Some(packet) => Ok(Some(packet)),
            None => {
                std::thread::sleep(timeout);
                Ok(None)
            }
        }
    }

    fn shutdown(&mut self) -> DriverResult<()> {
        self.probe.record(MockCall::Shutdown)?;
        self.received = None;
        self.encryption_key = None;
        Ok(())
    }
}

/// Factory building a new [`MockRadio`] per Connect, all sharing one probe
#[derive(Debug, Clone, Default)]
pub struct MockRadioFactory {
    probe: MockProbe,
}

impl MockRadioFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_probe(probe: MockProbe) -> Self {
        Self { probe }
    }

    pub fn probe(&self) -> MockProbe {
        self.probe.clone()
    }
}

impl DriverFactory for MockRadioFactory {
    fn create(&mut self, params: &RadioParameters) -> DriverResult<Box<dyn RadioDriver>> {
        self.probe.record(MockCall::Create(params.clone()))?;
        Ok(Box::new(MockRadio::new(params, self.probe.clone())))
    }
}
