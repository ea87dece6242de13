//! Air temperature and relative humidity, both served by the one DHT probe.
//!
//! The probe itself belongs to the HAL (`begin_climate_probe`,
//! `read_temperature_humidity`).  Each sensor here picks its half of the
//! pair.  Starting both sensors starts the probe once.

use super::SensorInfo;
use crate::app::ports::Hal;
use crate::devices::{Sensor, finite};
use crate::error::{HalError, SensorError};

/// Air temperature (°C).
#[derive(Debug)]
pub struct TemperatureSensor {
    info: SensorInfo,
}

impl TemperatureSensor {
    pub fn new(info: SensorInfo) -> Self {
        Self { info }
    }
}

impl Sensor for TemperatureSensor {
    fn info(&self) -> &SensorInfo {
        &self.info
    }

    fn begin<H: Hal>(&mut self, hal: &mut H) -> Result<(), HalError> {
        hal.begin_climate_probe()
    }

    fn read<H: Hal>(&mut self, hal: &mut H) -> Result<f32, SensorError> {
        let (celsius, _) = hal.read_temperature_humidity()?;
        finite(celsius)
    }
}

/// Relative humidity (%).
#[derive(Debug)]
pub struct HumiditySensor {
    info: SensorInfo,
}

impl HumiditySensor {
    pub fn new(info: SensorInfo) -> Self {
        Self { info }
    }
}

impl Sensor for HumiditySensor {
    fn info(&self) -> &SensorInfo {
        &self.info
    }

    fn begin<H: Hal>(&mut self, hal: &mut H) -> Result<(), HalError> {
        hal.begin_climate_probe()
    }

    fn read<H: Hal>(&mut self, hal: &mut H) -> Result<f32, SensorError> {
        let (_, humidity) = hal.read_temperature_humidity()?;
        finite(humidity)
    }
}
