//! Device contracts: [`Control`] (actuator) and [`Sensor`] (measurement).
//!
//! The variant sets are closed and known at build time, so the registry
//! stores them as enums ([`control::ControlDevice`],
//! [`crate::sensors::SensorDevice`]) and dispatches by `match` rather than
//! through trait objects.  The traits pin down the contract each variant
//! honours.

pub mod control;

use serde::Serialize;

use crate::app::ports::Hal;
use crate::error::{HalError, SensorError};
use crate::sensors::SensorInfo;

/// How a control drives its pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControlKind {
    /// Logical on/off.
    #[serde(rename = "digital")]
    Digital,
    /// Duty cycle.  The serial peer calls this `"analog"`.
    #[serde(rename = "analog")]
    Pwm,
}

/// Immutable identity of a control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlInfo {
    /// Hardware address, unique among registered controls, never 0.
    pub pin: u8,
    pub kind: ControlKind,
    /// Stable device name, e.g. `"exhaust_fan"`.
    pub name: &'static str,
}

/// An addressable actuator output.
pub trait Control {
    fn info(&self) -> ControlInfo;

    /// Configure the output.  Runs once at boot before any `set_value`;
    /// repeating it is harmless.
    fn begin<H: Hal>(&mut self, hal: &mut H) -> Result<(), HalError>;

    /// Apply `value`.  Digital: nonzero → high, zero → low.
    /// PWM: duty, clamped to the driver range.
    fn set_value<H: Hal>(&mut self, hal: &mut H, value: i32) -> Result<(), HalError>;

    /// Last value applied with `set_value` (0 before the first).
    fn value(&self) -> i32;
}

/// A readable measurement source.
pub trait Sensor {
    fn info(&self) -> &SensorInfo;

    /// One-time setup (bus init, interrupt wiring).
    fn begin<H: Hal>(&mut self, hal: &mut H) -> Result<(), HalError>;

    /// Latest measurement.  Never blocks beyond one bus transaction.
    fn read<H: Hal>(&mut self, hal: &mut H) -> Result<f32, SensorError>;
}

/// Map a raw driver value to a reading, rejecting NaN / infinity.
pub(crate) fn finite(value: f32) -> Result<f32, SensorError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SensorError::ReadFailed)
    }
}
