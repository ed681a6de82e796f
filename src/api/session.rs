//! Session adapter: connection lifecycle, send and bounded receive
//!
//! One session owns at most one driver. The driver is built on Connect from
//! the board parameters and the active configuration, and dropped on
//! Disconnect; it is never reused.

use crate::api::args::{outbound_packet, Arguments};
use crate::api::configuration::Configuration;
use crate::api::modem::apply_configuration;
use crate::api::types::{SessionError, SessionResult};
use crate::api::wait::{BoundedWait, WaitOutcome};
use crate::core::{InboundPacket, DRIVER_NAME};
use crate::hardware::{DriverFactory, RadioDriver, RadioParameters, ReceiveMode};
use crate::utils::config::ServiceConfig;
use log::{debug, info, trace, warn};
use serde_json::Value;

/// The adapter's single stateful instance
pub struct Session {
    name: String,
    factory: Box<dyn DriverFactory>,
    radio: RadioParameters,
    defaults: Configuration,
    configuration: Configuration,
    receive_wait: BoundedWait,
    /// Present exactly while connected
    driver: Option<Box<dyn RadioDriver>>,
}

impl Session {
    /// Create a disconnected session using the defaults from `config`
    pub fn new(config: &ServiceConfig, factory: Box<dyn DriverFactory>) -> Self {
        Self {
            name: config.service.name.clone(),
            factory,
            radio: config.radio.clone(),
            defaults: config.modem.clone(),
            configuration: config.modem.clone(),
            receive_wait: config.receive.bounded_wait(),
            driver: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.driver.is_some()
    }

    /// Configuration the next Connect will apply
    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    pub fn receive_wait(&self) -> BoundedWait {
        self.receive_wait
    }

    /// Build, initialise and configure a new driver.
    ///
    /// Any failure leaves the session disconnected; the half-initialised
    /// driver gets a best-effort shutdown and is dropped.
    pub fn connect(&mut self) -> SessionResult<()> {
        debug!("{}@Connect: Connect INIT", self.name);
        if self.is_connected() {
            debug!("{}@Connect: Module is already connected", self.name);
            return Err(SessionError::AlreadyConnected);
        }

        let channel = self.configuration.channel()?;
        debug!(
            "{}@Connect: MODE={} channel={}",
            self.name, self.configuration.active_preset, channel
        );
        let params = self.radio.on_channel(channel);
        let mut driver = self.factory.create(&params)?;

        if let Err(err) = self.bring_up(driver.as_mut()) {
            warn!("{}@Connect: initialisation failed: {}", self.name, err);
            if let Err(shutdown_err) = driver.shutdown() {
                debug!("{}@Connect: shutdown after failure also failed: {}", self.name, shutdown_err);
            }
            return Err(err);
        }

        self.driver = Some(driver);
        info!("{}@Connect: Connect OK", self.name);
        Ok(())
    }

    fn bring_up(&self, driver: &mut dyn RadioDriver) -> SessionResult<()> {
        debug!("performing calibration");
        driver.calibrate()?;

        let temperature = driver.read_temperature()?;
        debug!("radio temperature {} C", temperature);

        apply_configuration(driver, &self.configuration)?;

        debug!("reading all registers");
        for (address, value) in driver.read_all_registers()? {
            trace!("0x{:02X}: 0x{:02X}", address, value);
        }
        Ok(())
    }

    /// Drop the driver. The session counts as disconnected even when the
    /// driver's shutdown fails; that failure is still reported.
    pub fn disconnect(&mut self) -> SessionResult<()> {
        debug!("{}@Disconnect: Disconnect INIT", self.name);
        let mut driver = match self.driver.take() {
            Some(driver) => driver,
            None => {
                debug!("{}@Disconnect: Module is already disconnected", self.name);
                return Err(SessionError::NotConnected);
            }
        };

        driver.shutdown()?;
        info!("{}@Disconnect: Disconnect OK", self.name);
        Ok(())
    }

    /// Replace the configuration with the defaults overlaid by `args`.
    ///
    /// Takes effect on the next Connect.
    pub fn setup(&mut self, args: &Arguments) {
        debug!("{}@Setup: Setup INIT", self.name);
        self.configuration = Configuration::overlay(&self.defaults, args);
        debug!(
            "{}@Setup: MODEM_CONFIG={} key set={} channel={}",
            self.name,
            self.configuration.active_preset,
            !self.configuration.encryption_key.is_null(),
            self.configuration.channel
        );
    }

    pub fn send(&mut self, args: &Arguments) -> SessionResult<()> {
        debug!("{}@Send: Send INIT", self.name);
        let driver = self.driver.as_mut().ok_or_else(|| {
            debug!("Send: Module is not connected");
            SessionError::NotConnected
        })?;

        let packet = outbound_packet(args, driver.variant())?;
        driver.send(packet.identifier.as_ref(), &packet.payload)?;
        debug!("{}@Send: sent {} bytes", self.name, packet.payload.len());
        Ok(())
    }

    /// Wait for one frame.
    ///
    /// `Ok(None)` means nothing arrived within the receive timeout.
    pub fn receive(&mut self) -> SessionResult<Option<InboundPacket>> {
        debug!("{}@Receive: Receive INIT", self.name);
        let wait = self.receive_wait;
        let driver = self.driver.as_mut().ok_or_else(|| {
            debug!("Receive: Module is not connected");
            SessionError::NotConnected
        })?;

        let packet = match driver.variant().receive_mode() {
            ReceiveMode::Polling => {
                driver.begin_receive()?;
                match wait.poll(|| driver.receive_done())? {
                    WaitOutcome::Ready => Some(driver.last_packet()?),
                    WaitOutcome::TimedOut => None,
                }
            }
            ReceiveMode::Blocking => driver
                .wait_for_packet(wait.timeout)?
                .filter(|packet| !packet.data.is_empty()),
        };

        match &packet {
            Some(packet) => debug!(
                "{}@Receive: {} bytes, rssi {}",
                self.name,
                packet.data.len(),
                packet.rssi
            ),
            None => debug!("{}@Receive: timed out", self.name),
        }
        Ok(packet)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn driver_name(&self) -> &'static str {
        DRIVER_NAME
    }

    pub fn discover(&self, _args: &Value) -> SessionResult<Value> {
        Err(SessionError::NotImplemented)
    }

    pub fn exec(&mut self, _args: &Value) -> SessionResult<()> {
        Err(SessionError::NotImplemented)
    }

    pub fn subscribe(&mut self, _args: &Value) -> SessionResult<()> {
        Err(SessionError::NotImplemented)
    }
}
