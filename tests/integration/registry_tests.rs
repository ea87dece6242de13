//! Integration tests for the board registry: lookup identity, boot order
//! and construction-time validation.

use zucchini::board;
use zucchini::config::SystemConfig;
use zucchini::devices::control::DigitalControl;
use zucchini::devices::{Control, Sensor};
use zucchini::error::RegistryError;
use zucchini::pins;
use zucchini::registry::HardwareRegistry;
use zucchini::sensors::SensorInfo;
use zucchini::sensors::pulse::PulseCounter;
use zucchini::sensors::soil::SoilMoistureSensor;

use super::mock_hw::{HalCall, MockHal};

#[test]
fn lookup_returns_same_instance_every_time() {
    static PULSES: PulseCounter = PulseCounter::new();
    let reg = board::build_registry(&SystemConfig::default(), &PULSES).unwrap();

    for control in reg.all_controls() {
        let pin = control.info().pin;
        let a = reg.control_by_pin(pin).unwrap();
        let b = reg.control_by_pin(pin).unwrap();
        assert!(std::ptr::eq(a, b));
        assert!(std::ptr::eq(a, control));
    }
}

#[test]
fn unregistered_pins_not_found() {
    static PULSES: PulseCounter = PulseCounter::new();
    let reg = board::build_registry(&SystemConfig::default(), &PULSES).unwrap();

    for pin in [0u8, 1, 2, 3, 4, 10, 11, 99, 255] {
        assert!(reg.control_by_pin(pin).is_none(), "pin {pin}");
    }
    assert_eq!(reg.sensor_count(), 4);
    assert_eq!(reg.control_count(), 5);
}

#[test]
fn sensors_start_before_controls() {
    static PULSES: PulseCounter = PulseCounter::new();
    let mut reg = board::build_registry(&SystemConfig::default(), &PULSES).unwrap();
    let mut hal = MockHal::new();

    assert_eq!(reg.begin_all(&mut hal), 0);

    let first_control = hal
        .calls
        .iter()
        .position(|c| matches!(c, HalCall::ConfigureOutput(_) | HalCall::ConfigurePwm { .. }))
        .unwrap();
    let last_sensor = hal
        .calls
        .iter()
        .rposition(|c| matches!(c, HalCall::BeginClimateProbe | HalCall::AttachPulseCounter(_)))
        .unwrap();
    assert!(last_sensor < first_control, "{:?}", hal.calls);

    assert!(hal.calls.contains(&HalCall::AttachPulseCounter(pins::EXH_FAN_INTERRUPT_PIN)));
    assert!(hal.calls.contains(&HalCall::ConfigurePwm {
        pin: pins::EXH_FAN_CONTROL_PIN,
        freq_hz: 25_000
    }));
    assert_eq!(hal.duty(pins::EXH_FAN_CONTROL_PIN), Some(0));
}

#[test]
fn begin_all_is_idempotent() {
    static PULSES: PulseCounter = PulseCounter::new();
    let mut reg = board::build_registry(&SystemConfig::default(), &PULSES).unwrap();
    let mut hal = MockHal::new();

    reg.begin_all(&mut hal);
    let boot_calls = hal.calls.len();
    reg.begin_all(&mut hal);
    assert_eq!(hal.calls.len(), boot_calls);
}

#[test]
fn sentinel_values_rejected_at_construction() {
    let mut reg = HardwareRegistry::new();
    assert_eq!(
        reg.register_control(DigitalControl::new(0, "ghost")).err(),
        Some(RegistryError::ReservedPin)
    );

    let unnamed = SoilMoistureSensor::new(SensorInfo::new("", "Soil", "%", &[]).unwrap(), 1);
    assert_eq!(reg.register_sensor(unnamed).err(), Some(RegistryError::EmptyId));

    assert_eq!(reg.control_count(), 0);
    assert_eq!(reg.sensor_count(), 0);
}

#[test]
fn sensor_ids_resolve() {
    static PULSES: PulseCounter = PulseCounter::new();
    let reg = board::build_registry(&SystemConfig::default(), &PULSES).unwrap();

    let ef = reg.sensor_by_id("ef").unwrap();
    assert_eq!(ef.info().unit, "rpm");
    assert!(reg.sensor_by_id("xx").is_none());
}
