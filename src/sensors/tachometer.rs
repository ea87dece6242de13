//! Exhaust fan tachometer.
//!
//! The fan's open-collector tach line pulls low twice per revolution.  The
//! GPIO ISR counts falling edges into a [`PulseCounter`]; each `read`
//! drains it and converts the count over one sample window to RPM.

use super::SensorInfo;
use super::pulse::PulseCounter;
use crate::app::ports::Hal;
use crate::devices::Sensor;
use crate::error::{HalError, SensorError};

/// Tach edges per physical revolution for the fitted fan.
const EDGES_PER_REVOLUTION: f32 = 2.0;

pub struct TachometerSensor {
    info: SensorInfo,
    interrupt_pin: u8,
    counter: &'static PulseCounter,
    /// Seconds of pulses accumulated between reads.
    window_secs: u8,
}

impl TachometerSensor {
    pub fn new(
        info: SensorInfo,
        interrupt_pin: u8,
        counter: &'static PulseCounter,
        window_secs: u8,
    ) -> Self {
        Self {
            info,
            interrupt_pin,
            counter,
            window_secs: window_secs.max(1),
        }
    }

    /// Convert a drained pulse count to revolutions per minute.
    pub fn rpm(count: u16, window_secs: u8) -> f32 {
        f32::from(count) * 60.0 / EDGES_PER_REVOLUTION / f32::from(window_secs.max(1))
    }
}

impl core::fmt::Debug for TachometerSensor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TachometerSensor")
            .field("info", &self.info)
            .field("interrupt_pin", &self.interrupt_pin)
            .field("window_secs", &self.window_secs)
            .finish_non_exhaustive()
    }
}

impl Sensor for TachometerSensor {
    fn info(&self) -> &SensorInfo {
        &self.info
    }

    fn begin<H: Hal>(&mut self, hal: &mut H) -> Result<(), HalError> {
        hal.attach_pulse_counter(self.interrupt_pin, self.counter)
    }

    fn read<H: Hal>(&mut self, _hal: &mut H) -> Result<f32, SensorError> {
        let count = self.counter.read_and_reset();
        Ok(Self::rpm(count, self.window_secs))
    }
}
