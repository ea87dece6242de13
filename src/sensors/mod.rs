//! Sensor subsystem: individual drivers and the closed [`SensorDevice`] set.
//!
//! Every sensor carries a [`SensorInfo`]: its id, display label and unit,
//! plus the pins of the controls it is grouped with on the host's display.
//! The association is informational only; a sensor never drives a control.

pub mod climate;
pub mod pulse;
pub mod soil;
pub mod tachometer;

use heapless::Vec;

use crate::app::ports::Hal;
use crate::devices::Sensor;
use crate::error::{HalError, RegistryError, SensorError};
use climate::{HumiditySensor, TemperatureSensor};
use soil::SoilMoistureSensor;
use tachometer::TachometerSensor;

/// Most controls a single sensor can be associated with.
pub const MAX_ASSOCIATED: usize = 4;

/// Immutable identity and display metadata of a sensor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorInfo {
    /// Short stable id, e.g. `"dt"`.  Unique, never empty.
    pub id: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    /// Associated control pins, in display order.
    pub controls: Vec<u8, MAX_ASSOCIATED>,
}

impl SensorInfo {
    pub fn new(
        id: &'static str,
        label: &'static str,
        unit: &'static str,
        controls: &[u8],
    ) -> Result<Self, RegistryError> {
        let controls = Vec::from_slice(controls).map_err(|()| RegistryError::CapacityExceeded)?;
        Ok(Self {
            id,
            label,
            unit,
            controls,
        })
    }
}

/// Every sensor the registry can hold.
#[derive(Debug)]
pub enum SensorDevice {
    Temperature(TemperatureSensor),
    Humidity(HumiditySensor),
    SoilMoisture(SoilMoistureSensor),
    Tachometer(TachometerSensor),
}

impl From<TemperatureSensor> for SensorDevice {
    fn from(s: TemperatureSensor) -> Self {
        Self::Temperature(s)
    }
}

impl From<HumiditySensor> for SensorDevice {
    fn from(s: HumiditySensor) -> Self {
        Self::Humidity(s)
    }
}

impl From<SoilMoistureSensor> for SensorDevice {
    fn from(s: SoilMoistureSensor) -> Self {
        Self::SoilMoisture(s)
    }
}

impl From<TachometerSensor> for SensorDevice {
    fn from(s: TachometerSensor) -> Self {
        Self::Tachometer(s)
    }
}

impl Sensor for SensorDevice {
    fn info(&self) -> &SensorInfo {
        match self {
            Self::Temperature(s) => s.info(),
            Self::Humidity(s) => s.info(),
            Self::SoilMoisture(s) => s.info(),
            Self::Tachometer(s) => s.info(),
        }
    }

    fn begin<H: Hal>(&mut self, hal: &mut H) -> Result<(), HalError> {
        match self {
            Self::Temperature(s) => s.begin(hal),
            Self::Humidity(s) => s.begin(hal),
            Self::SoilMoisture(s) => s.begin(hal),
            Self::Tachometer(s) => s.begin(hal),
        }
    }

    fn read<H: Hal>(&mut self, hal: &mut H) -> Result<f32, SensorError> {
        match self {
            Self::Temperature(s) => s.read(hal),
            Self::Humidity(s) => s.read(hal),
            Self::SoilMoisture(s) => s.read(hal),
            Self::Tachometer(s) => s.read(hal),
        }
    }
}
