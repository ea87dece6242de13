//! Composition root for the grow-box board.
//!
//! Builds the device table from [`crate::pins`] in one place, in a fixed
//! order: controls first, then the sensors that name them.  The registry
//! rejects any other order, so wiring mistakes fail at boot instead of
//! producing a half-populated table.
//!
//! | Sensor | Label             | Unit | Associated controls        |
//! |--------|-------------------|------|----------------------------|
//! | `dt`   | Temperature       | C    | exhaust_fan                |
//! | `dh`   | Humidity          | %    | alarm_light, humidifier    |
//! | `ef`   | Exhaust Fan Speed | rpm  | exhaust_fan                |
//! | `sm`   | Soil Moisture     | %    | water_pump                 |

use crate::config::SystemConfig;
use crate::devices::control::{DigitalControl, PwmControl};
use crate::error::Result;
use crate::pins;
use crate::registry::HardwareRegistry;
use crate::sensors::SensorInfo;
use crate::sensors::climate::{HumiditySensor, TemperatureSensor};
use crate::sensors::pulse::PulseCounter;
use crate::sensors::soil::SoilMoistureSensor;
use crate::sensors::tachometer::TachometerSensor;

/// Exhaust fan tach edges, written by the GPIO ISR.
pub static FAN_PULSES: PulseCounter = PulseCounter::new();

/// Build the registry for this board.  `fan_pulses` is normally
/// [`FAN_PULSES`]; tests pass their own counter.
pub fn build_registry(
    config: &SystemConfig,
    fan_pulses: &'static PulseCounter,
) -> Result<HardwareRegistry> {
    let mut registry = HardwareRegistry::new();

    registry
        .register_control(DigitalControl::new(pins::ALARM_LIGHT_PIN, "alarm_light"))?
        .register_control(PwmControl::new(
            pins::EXH_FAN_CONTROL_PIN,
            "exhaust_fan",
            config.fan_pwm_freq_hz,
        ))?
        .register_control(DigitalControl::new(pins::HUMIDIFIER_PIN, "humidifier"))?
        .register_control(DigitalControl::new(pins::POWER_SWITCH_PIN, "power_switch"))?
        .register_control(DigitalControl::new(pins::WATER_PUMP_PIN, "water_pump"))?;

    registry
        .register_sensor(TemperatureSensor::new(SensorInfo::new(
            "dt",
            "Temperature",
            "C",
            &[pins::EXH_FAN_CONTROL_PIN],
        )?))?
        .register_sensor(HumiditySensor::new(SensorInfo::new(
            "dh",
            "Humidity",
            "%",
            &[pins::ALARM_LIGHT_PIN, pins::HUMIDIFIER_PIN],
        )?))?
        .register_sensor(TachometerSensor::new(
            SensorInfo::new("ef", "Exhaust Fan Speed", "rpm", &[pins::EXH_FAN_CONTROL_PIN])?,
            pins::EXH_FAN_INTERRUPT_PIN,
            fan_pulses,
            config.telemetry_multiplier,
        ))?
        .register_sensor(SoilMoistureSensor::new(
            SensorInfo::new("sm", "Soil Moisture", "%", &[pins::WATER_PUMP_PIN])?,
            pins::SOIL_MOISTURE_PIN,
        ))?;

    Ok(registry)
}
