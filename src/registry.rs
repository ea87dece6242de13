//! Hardware registry: the fixed table of every control and sensor.
//!
//! Explicit-length, fixed-capacity storage replaces an end-of-table
//! sentinel: a pin 0 or an empty id is rejected at registration instead of
//! silently truncating lookups.  Registration order is the emission order
//! for telemetry and the order `begin_all` visits devices.
//!
//! A sensor may only name controls that are already registered, so a
//! table built top-to-bottom cannot reference a control that does not
//! exist yet.

use heapless::Vec;
use log::{info, warn};

use crate::app::ports::Hal;
use crate::devices::control::ControlDevice;
use crate::devices::{Control, ControlInfo, Sensor};
use crate::error::{HalError, RegistryError, SensorError};
use crate::sensors::{SensorDevice, SensorInfo};

pub const MAX_CONTROLS: usize = 8;
pub const MAX_SENSORS: usize = 8;

pub struct HardwareRegistry {
    controls: Vec<ControlDevice, MAX_CONTROLS>,
    sensors: Vec<SensorDevice, MAX_SENSORS>,
    started: bool,
}

impl HardwareRegistry {
    pub const fn new() -> Self {
        Self {
            controls: Vec::new(),
            sensors: Vec::new(),
            started: false,
        }
    }

    // ── Construction ──────────────────────────────────────────

    /// Add a control.  Pin must be nonzero and not yet taken.
    pub fn register_control(
        &mut self,
        control: impl Into<ControlDevice>,
    ) -> Result<&mut Self, RegistryError> {
        let control = control.into();
        let pin = control.info().pin;
        if pin == 0 {
            return Err(RegistryError::ReservedPin);
        }
        if self.control_by_pin(pin).is_some() {
            return Err(RegistryError::DuplicatePin(pin));
        }
        self.controls
            .push(control)
            .map_err(|_| RegistryError::CapacityExceeded)?;
        Ok(self)
    }

    /// Add a sensor.  Id must be non-empty and unique, and every associated
    /// pin must name a registered control.
    pub fn register_sensor(
        &mut self,
        sensor: impl Into<SensorDevice>,
    ) -> Result<&mut Self, RegistryError> {
        let sensor = sensor.into();
        let info = sensor.info();
        if info.id.is_empty() {
            return Err(RegistryError::EmptyId);
        }
        if self.sensor_by_id(info.id).is_some() {
            return Err(RegistryError::DuplicateId(info.id));
        }
        if let Some(&pin) = info
            .controls
            .iter()
            .find(|&&pin| self.control_by_pin(pin).is_none())
        {
            return Err(RegistryError::UnknownControl(pin));
        }
        self.sensors
            .push(sensor)
            .map_err(|_| RegistryError::CapacityExceeded)?;
        Ok(self)
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Run `begin` on every sensor, then every control.  Only the first
    /// call does anything.  A device that fails to start is logged and
    /// skipped; the rest still start.
    pub fn begin_all<H: Hal>(&mut self, hal: &mut H) -> usize {
        if self.started {
            warn!("registry: begin_all called again, ignoring");
            return 0;
        }
        self.started = true;

        let mut failures = 0;
        for sensor in &mut self.sensors {
            if let Err(e) = sensor.begin(hal) {
                warn!("registry: sensor '{}' failed to start: {}", sensor.info().id, e);
                failures += 1;
            }
        }
        for control in &mut self.controls {
            if let Err(e) = control.begin(hal) {
                let ci = control.info();
                warn!("registry: control '{}' (pin {}) failed to start: {}", ci.name, ci.pin, e);
                failures += 1;
            }
        }
        info!(
            "registry: started {} sensors, {} controls ({} failures)",
            self.sensors.len(),
            self.controls.len(),
            failures
        );
        failures
    }

    /// Whether `begin_all` has run.
    pub fn is_started(&self) -> bool {
        self.started
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn all_controls(&self) -> &[ControlDevice] {
        &self.controls
    }

    pub fn control_by_pin(&self, pin: u8) -> Option<&ControlDevice> {
        self.controls.iter().find(|c| c.info().pin == pin)
    }

    pub fn control_by_pin_mut(&mut self, pin: u8) -> Option<&mut ControlDevice> {
        self.controls.iter_mut().find(|c| c.info().pin == pin)
    }

    pub fn control_count(&self) -> usize {
        self.controls.len()
    }

    pub fn all_sensors(&self) -> &[SensorDevice] {
        &self.sensors
    }

    pub fn sensor_by_id(&self, id: &str) -> Option<&SensorDevice> {
        self.sensors.iter().find(|s| s.info().id == id)
    }

    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
    }

    /// Resolve a sensor's associated pins to control identities, in order.
    pub fn associated_controls<'a>(
        &'a self,
        info: &'a SensorInfo,
    ) -> impl Iterator<Item = ControlInfo> + 'a {
        info.controls
            .iter()
            .filter_map(|&pin| self.control_by_pin(pin).map(|c| c.info()))
    }

    /// Read the sensor at `index`, returning a copy of its identity with
    /// the reading so the caller can release the mutable borrow.  Before
    /// `begin_all` no device is touched and every read is `NotStarted`.
    pub(crate) fn read_sensor<H: Hal>(
        &mut self,
        index: usize,
        hal: &mut H,
    ) -> Option<(SensorInfo, Result<f32, SensorError>)> {
        let started = self.started;
        let sensor = self.sensors.get_mut(index)?;
        let reading = if started {
            sensor.read(hal)
        } else {
            Err(SensorError::NotStarted)
        };
        Some((sensor.info().clone(), reading))
    }

    /// Apply `value` to the control on `pin`.
    pub(crate) fn set_control<H: Hal>(
        &mut self,
        pin: u8,
        hal: &mut H,
        value: i32,
    ) -> Option<Result<(), HalError>> {
        self.control_by_pin_mut(pin).map(|c| c.set_value(hal, value))
    }
}

impl Default for HardwareRegistry {
    fn default() -> Self {
        Self::new()
    }
}
