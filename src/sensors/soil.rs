//! Capacitive soil moisture probe on one ADC pin.
//!
//! Reports the raw conversion.  Scaling to a percentage is the host's job:
//! the dry/wet calibration points depend on the pot and the substrate.

use super::SensorInfo;
use crate::app::ports::Hal;
use crate::devices::Sensor;
use crate::error::{HalError, SensorError};

#[derive(Debug)]
pub struct SoilMoistureSensor {
    info: SensorInfo,
    adc_pin: u8,
}

impl SoilMoistureSensor {
    pub fn new(info: SensorInfo, adc_pin: u8) -> Self {
        Self { info, adc_pin }
    }
}

impl Sensor for SoilMoistureSensor {
    fn info(&self) -> &SensorInfo {
        &self.info
    }

    fn begin<H: Hal>(&mut self, _hal: &mut H) -> Result<(), HalError> {
        // ADC channels are configured on first conversion.
        Ok(())
    }

    fn read<H: Hal>(&mut self, hal: &mut H) -> Result<f32, SensorError> {
        Ok(f32::from(hal.read_analog(self.adc_pin)?))
    }
}
