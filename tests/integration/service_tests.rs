//! Integration tests for the GrowService control loop: command handling,
//! telemetry cadence and emitted events, driven by a simulated clock.

use embedded_hal::digital::PinState;
use serde_json::Value;

use zucchini::app::events::AppEvent;
use zucchini::app::service::GrowService;
use zucchini::board;
use zucchini::config::SystemConfig;
use zucchini::error::{HalError, ProtocolError, SensorError};
use zucchini::pins;
use zucchini::sensors::pulse::PulseCounter;

use super::mock_hw::{MemoryTransport, MockHal, RecordingSink};

fn make_service(
    config: &SystemConfig,
    pulses: &'static PulseCounter,
) -> (GrowService<MemoryTransport>, MockHal, RecordingSink) {
    let registry = board::build_registry(config, pulses).unwrap();
    let mut hal = MockHal::new();
    hal.set_analog(pins::SOIL_MOISTURE_PIN, 900);
    let mut sink = RecordingSink::default();
    let mut service = GrowService::new(config, registry, MemoryTransport::new());
    service.start(0, &mut hal, &mut sink);
    (service, hal, sink)
}

#[test]
fn start_reports_device_counts() {
    static PULSES: PulseCounter = PulseCounter::new();
    let (_, _, sink) = make_service(&SystemConfig::default(), &PULSES);
    assert_eq!(
        sink.events,
        [AppEvent::Started {
            controls: 5,
            sensors: 4
        }]
    );
}

#[test]
fn commands_and_rejections_are_counted() {
    static PULSES: PulseCounter = PulseCounter::new();
    let (mut svc, mut hal, mut sink) = make_service(&SystemConfig::default(), &PULSES);

    svc.transport_mut().send_line(r#"{"command":"set","pin":8,"value":1}"#);
    svc.transport_mut().send_line(r#"{"command":"set","pin":42,"value":1}"#);
    svc.poll(10, &mut hal, &mut sink);
    svc.poll(20, &mut hal, &mut sink);

    assert_eq!(hal.level(8), Some(PinState::High));
    assert_eq!(svc.commands_applied(), 1);
    assert_eq!(svc.commands_rejected(), 1);
    assert!(sink.events.contains(&AppEvent::CommandApplied { pin: 8, value: 1 }));
    assert!(
        sink.events
            .contains(&AppEvent::CommandRejected(ProtocolError::UnknownTarget))
    );
    assert_eq!(
        svc.transport_mut().take_lines(),
        [r#"{"sensor":"error","value":"No control for pin"}"#]
    );
}

#[test]
fn telemetry_every_interval_from_last_emission() {
    static PULSES: PulseCounter = PulseCounter::new();
    let (mut svc, mut hal, mut sink) = make_service(&SystemConfig::default(), &PULSES);

    let mut emitted_at = Vec::new();
    for now in (0..=3_500).step_by(50) {
        if svc.poll(now, &mut hal, &mut sink).telemetry.is_some() {
            emitted_at.push(now);
        }
    }
    assert_eq!(emitted_at, [1_000, 2_000, 3_000]);
    assert_eq!(svc.telemetry_cycles(), 3);
    assert_eq!(svc.transport_mut().take_lines().len(), 12);
}

#[test]
fn multiplier_stretches_interval_and_rpm_window() {
    static PULSES: PulseCounter = PulseCounter::new();
    let config = SystemConfig {
        telemetry_multiplier: 2,
        ..SystemConfig::default()
    };
    let (mut svc, mut hal, mut sink) = make_service(&config, &PULSES);

    // 2 s window, 80 edges → 40 rev → 1200 rpm.
    hal.pulse(pins::EXH_FAN_INTERRUPT_PIN, 80);
    assert!(svc.poll(1_999, &mut hal, &mut sink).telemetry.is_none());
    assert!(svc.poll(2_000, &mut hal, &mut sink).telemetry.is_some());

    let lines = svc.transport_mut().take_lines();
    let ef: Value = serde_json::from_str(&lines[2]).unwrap();
    assert_eq!(ef["sensor"], "ef");
    assert_eq!(ef["value"], 1200.0);
}

#[test]
fn sensor_fault_events_and_null_values() {
    static PULSES: PulseCounter = PulseCounter::new();
    let (mut svc, mut hal, mut sink) = make_service(&SystemConfig::default(), &PULSES);
    hal.climate = Err(HalError::Checksum);

    let report = svc.emit_telemetry(&mut hal, &mut sink);
    assert_eq!(report.records, 4);

    let faults: Vec<_> = sink
        .events
        .iter()
        .filter_map(|e| match e {
            AppEvent::SensorFault { id, error } => Some((*id, *error)),
            _ => None,
        })
        .collect();
    assert_eq!(
        faults,
        [("dt", SensorError::ReadFailed), ("dh", SensorError::ReadFailed)]
    );
    assert_eq!(
        sink.events.last(),
        Some(&AppEvent::TelemetryEmitted {
            records: 4,
            write_failures: 0
        })
    );
}

#[test]
fn command_and_telemetry_in_same_iteration() {
    static PULSES: PulseCounter = PulseCounter::new();
    let (mut svc, mut hal, mut sink) = make_service(&SystemConfig::default(), &PULSES);

    svc.transport_mut().send_line(r#"{"command":"set","pin":6,"value":200}"#);
    let out = svc.poll(1_000, &mut hal, &mut sink);
    assert!(out.command.is_some());
    assert!(out.telemetry.is_some());
    assert_eq!(hal.duty(6), Some(200));
}
