//! GPIO / peripheral pin assignments for the grow-box controller board.
//!
//! Single source of truth: the composition root in [`crate::board`]
//! references this module rather than hard-coding pin numbers.
//!
//! GPIO 0 is a strapping pin on the ESP32-S3 and is never wired to a
//! device; the registry rejects it as a control address.

// ---------------------------------------------------------------------------
// Actuators: digital (relay / MOSFET boards, active HIGH)
// ---------------------------------------------------------------------------

/// Alarm light relay.
pub const ALARM_LIGHT_PIN: u8 = 5;
/// Ultrasonic humidifier relay.
pub const HUMIDIFIER_PIN: u8 = 7;
/// Mains power switch relay.
pub const POWER_SWITCH_PIN: u8 = 8;
/// Irrigation water pump MOSFET.
pub const WATER_PUMP_PIN: u8 = 9;

// ---------------------------------------------------------------------------
// Actuators: PWM
// ---------------------------------------------------------------------------

/// 4-wire exhaust fan PWM input (LEDC).
pub const EXH_FAN_CONTROL_PIN: u8 = 6;

// ---------------------------------------------------------------------------
// Sensors
// ---------------------------------------------------------------------------

/// DHT single-wire data line (external 10 kΩ pull-up).
pub const DHT_PIN: u8 = 10;
/// Capacitive soil moisture probe, analog out.  GPIO 1 = ADC1 channel 0.
pub const SOIL_MOISTURE_PIN: u8 = 1;
/// Exhaust fan tachometer, open-collector, falling-edge interrupt.
pub const EXH_FAN_INTERRUPT_PIN: u8 = 11;

/// Which DHT part is fitted on [`DHT_PIN`].
pub const DHT_TYPE: crate::drivers::dht::DhtModel = crate::drivers::dht::DhtModel::Dht22;

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// Highest duty value accepted by the PWM driver.
pub const PWM_MAX_DUTY: u8 = u8::MAX;
