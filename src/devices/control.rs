//! Actuator outputs: relay-style digital controls and the PWM fan control.
//!
//! Both are dumb actuators.  They remember the last applied value for
//! observability; the hardware state lives behind the [`Hal`].

use embedded_hal::digital::PinState;
use log::debug;

use super::{Control, ControlInfo, ControlKind};
use crate::app::ports::Hal;
use crate::error::HalError;
use crate::pins::PWM_MAX_DUTY;

// ── Digital ───────────────────────────────────────────────────

/// On/off output (light, humidifier, pump, power switch).  The variants
/// differ only in pin and name.
#[derive(Debug)]
pub struct DigitalControl {
    pin: u8,
    name: &'static str,
    value: i32,
}

impl DigitalControl {
    pub const fn new(pin: u8, name: &'static str) -> Self {
        Self { pin, name, value: 0 }
    }

    /// Logical state of the output.
    pub fn is_on(&self) -> bool {
        self.value != 0
    }
}

impl Control for DigitalControl {
    fn info(&self) -> ControlInfo {
        ControlInfo {
            pin: self.pin,
            kind: ControlKind::Digital,
            name: self.name,
        }
    }

    fn begin<H: Hal>(&mut self, hal: &mut H) -> Result<(), HalError> {
        hal.configure_output(self.pin)?;
        self.value = 0;
        Ok(())
    }

    fn set_value<H: Hal>(&mut self, hal: &mut H, value: i32) -> Result<(), HalError> {
        hal.set_digital(self.pin, PinState::from(value != 0))?;
        self.value = value;
        Ok(())
    }

    fn value(&self) -> i32 {
        self.value
    }
}

// ── PWM ───────────────────────────────────────────────────────

/// Duty-cycle output (exhaust fan speed).
#[derive(Debug)]
pub struct PwmControl {
    pin: u8,
    name: &'static str,
    freq_hz: u32,
    value: i32,
}

impl PwmControl {
    pub const fn new(pin: u8, name: &'static str, freq_hz: u32) -> Self {
        Self {
            pin,
            name,
            freq_hz,
            value: 0,
        }
    }

    /// Duty that reaches the driver for a requested value.
    pub fn duty_for(value: i32) -> u8 {
        value.clamp(0, i32::from(PWM_MAX_DUTY)) as u8
    }
}

impl Control for PwmControl {
    fn info(&self) -> ControlInfo {
        ControlInfo {
            pin: self.pin,
            kind: ControlKind::Pwm,
            name: self.name,
        }
    }

    fn begin<H: Hal>(&mut self, hal: &mut H) -> Result<(), HalError> {
        hal.configure_pwm(self.pin, self.freq_hz)?;
        hal.set_pwm(self.pin, 0)?;
        self.value = 0;
        Ok(())
    }

    fn set_value<H: Hal>(&mut self, hal: &mut H, value: i32) -> Result<(), HalError> {
        let duty = Self::duty_for(value);
        if i32::from(duty) != value {
            debug!("{}: duty {} clamped to {}", self.name, value, duty);
        }
        hal.set_pwm(self.pin, duty)?;
        self.value = i32::from(duty);
        Ok(())
    }

    fn value(&self) -> i32 {
        self.value
    }
}

// ── Closed variant set ────────────────────────────────────────

/// Every control the registry can hold.
#[derive(Debug)]
pub enum ControlDevice {
    Digital(DigitalControl),
    Pwm(PwmControl),
}

impl From<DigitalControl> for ControlDevice {
    fn from(c: DigitalControl) -> Self {
        Self::Digital(c)
    }
}

impl From<PwmControl> for ControlDevice {
    fn from(c: PwmControl) -> Self {
        Self::Pwm(c)
    }
}

impl Control for ControlDevice {
    fn info(&self) -> ControlInfo {
        match self {
            Self::Digital(c) => c.info(),
            Self::Pwm(c) => c.info(),
        }
    }

    fn begin<H: Hal>(&mut self, hal: &mut H) -> Result<(), HalError> {
        match self {
            Self::Digital(c) => c.begin(hal),
            Self::Pwm(c) => c.begin(hal),
        }
    }

    fn set_value<H: Hal>(&mut self, hal: &mut H, value: i32) -> Result<(), HalError> {
        match self {
            Self::Digital(c) => c.set_value(hal, value),
            Self::Pwm(c) => c.set_value(hal, value),
        }
    }

    fn value(&self) -> i32 {
        match self {
            Self::Digital(c) => c.value(),
            Self::Pwm(c) => c.value(),
        }
    }
}
