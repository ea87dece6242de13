//! Integration tests for the serial protocol against the real board table.
//!
//! Commands go in through an in-memory transport, land on `MockHal`, and
//! replies / telemetry come back as JSON lines.

use embedded_hal::digital::PinState;
use serde_json::{Value, json};

use zucchini::board;
use zucchini::config::SystemConfig;
use zucchini::error::{ProtocolError, SensorError};
use zucchini::pins;
use zucchini::protocol::{Dispatch, ProtocolHandler};
use zucchini::registry::HardwareRegistry;
use zucchini::sensors::pulse::PulseCounter;

use super::mock_hw::{MemoryTransport, MockHal};

fn make_board(
    pulses: &'static PulseCounter,
) -> (ProtocolHandler<MemoryTransport>, HardwareRegistry, MockHal) {
    let config = SystemConfig::default();
    let mut registry = board::build_registry(&config, pulses).unwrap();
    let mut hal = MockHal::new();
    hal.set_analog(pins::SOIL_MOISTURE_PIN, 1873);
    registry.begin_all(&mut hal);
    hal.clear();
    (
        ProtocolHandler::new(MemoryTransport::new(), config.max_line_len),
        registry,
        hal,
    )
}

fn parse(line: &str) -> Value {
    serde_json::from_str(line).unwrap()
}

// ── Command path ──────────────────────────────────────────────

#[test]
fn alarm_light_on_then_off() {
    static PULSES: PulseCounter = PulseCounter::new();
    let (mut ph, mut reg, mut hal) = make_board(&PULSES);

    ph.transport_mut().send_line(r#"{"command":"set","pin":5,"value":1}"#);
    assert_eq!(
        ph.poll(&mut reg, &mut hal),
        Some(Ok(Dispatch::Applied { pin: 5, value: 1 }))
    );
    assert_eq!(hal.level(5), Some(PinState::High));

    ph.transport_mut().send_line(r#"{"command":"set","pin":5,"value":0}"#);
    ph.poll(&mut reg, &mut hal);
    assert_eq!(hal.level(5), Some(PinState::Low));

    assert!(ph.transport_mut().take_lines().is_empty(), "commands are fire-and-forget");
}

#[test]
fn unregistered_pin_is_reported_without_mutation() {
    static PULSES: PulseCounter = PulseCounter::new();
    let (mut ph, mut reg, mut hal) = make_board(&PULSES);

    ph.transport_mut().send_line(r#"{"command":"set","pin":99,"value":1}"#);
    assert_eq!(ph.poll(&mut reg, &mut hal), Some(Err(ProtocolError::UnknownTarget)));

    let lines = ph.transport_mut().take_lines();
    assert_eq!(lines, [r#"{"sensor":"error","value":"No control for pin"}"#]);
    assert!(hal.writes().is_empty());
}

#[test]
fn missing_fields_variants() {
    static PULSES: PulseCounter = PulseCounter::new();
    let (mut ph, mut reg, mut hal) = make_board(&PULSES);

    for line in [
        r#"{"pin":5,"value":1}"#,
        r#"{"command":"set","pin":-1,"value":1}"#,
        r#"{"command":"set","pin":5,"value":-1}"#,
        r#"{"command":"set","pin":5}"#,
    ] {
        ph.transport_mut().send_line(line);
        assert_eq!(
            ph.poll(&mut reg, &mut hal),
            Some(Err(ProtocolError::MissingFields)),
            "{line}"
        );
    }
    let lines = ph.transport_mut().take_lines();
    assert_eq!(lines.len(), 4);
    for line in &lines {
        assert_eq!(parse(line), json!({"sensor": "error", "value": "Missing fields"}));
    }
    assert!(hal.writes().is_empty());
}

#[test]
fn malformed_line_gets_diagnostic() {
    static PULSES: PulseCounter = PulseCounter::new();
    let (mut ph, mut reg, mut hal) = make_board(&PULSES);

    ph.transport_mut().send_line("{command: set}");
    assert!(matches!(
        ph.poll(&mut reg, &mut hal),
        Some(Err(ProtocolError::MalformedInput(_)))
    ));

    let lines = ph.transport_mut().take_lines();
    let reply = parse(&lines[0]);
    assert_eq!(reply["sensor"], "error");
    assert!(!reply["value"].as_str().unwrap().is_empty());
    assert!(hal.writes().is_empty());
}

#[test]
fn fan_duty_is_clamped() {
    static PULSES: PulseCounter = PulseCounter::new();
    let (mut ph, mut reg, mut hal) = make_board(&PULSES);

    ph.transport_mut().send_line(r#"{"command":"set","pin":6,"value":128}"#);
    ph.poll(&mut reg, &mut hal);
    assert_eq!(hal.duty(6), Some(128));

    ph.transport_mut().send_line(r#"{"command":"set","pin":6,"value":4000}"#);
    ph.poll(&mut reg, &mut hal);
    assert_eq!(hal.duty(6), Some(255));
}

#[test]
fn any_verb_dispatches() {
    static PULSES: PulseCounter = PulseCounter::new();
    let (mut ph, mut reg, mut hal) = make_board(&PULSES);

    ph.transport_mut().send_line(r#"{"command":"toggle","pin":9,"value":1}"#);
    assert_eq!(
        ph.poll(&mut reg, &mut hal),
        Some(Ok(Dispatch::Applied { pin: 9, value: 1 }))
    );
    assert_eq!(hal.level(9), Some(PinState::High));
}

#[test]
fn driver_failure_is_not_a_protocol_error() {
    static PULSES: PulseCounter = PulseCounter::new();
    let (mut ph, mut reg, mut hal) = make_board(&PULSES);
    hal.fail_writes_on(7);

    ph.transport_mut().send_line(r#"{"command":"set","pin":7,"value":1}"#);
    assert!(matches!(
        ph.poll(&mut reg, &mut hal),
        Some(Ok(Dispatch::DriverFault { pin: 7, .. }))
    ));
    assert!(ph.transport_mut().take_lines().is_empty());
}

#[test]
fn crlf_and_split_reads() {
    static PULSES: PulseCounter = PulseCounter::new();
    let (mut ph, mut reg, mut hal) = make_board(&PULSES);

    ph.transport_mut().send_raw(br#"{"command":"set","#);
    assert_eq!(ph.poll(&mut reg, &mut hal), None);
    ph.transport_mut().send_raw(b"\"pin\":8,\"value\":1}\r\n");
    assert_eq!(
        ph.poll(&mut reg, &mut hal),
        Some(Ok(Dispatch::Applied { pin: 8, value: 1 }))
    );
}

#[test]
fn overlong_line_rejected_and_link_recovers() {
    static PULSES: PulseCounter = PulseCounter::new();
    let (mut ph, mut reg, mut hal) = make_board(&PULSES);

    let junk = "x".repeat(1000);
    ph.transport_mut().send_line(&junk);
    ph.transport_mut().send_line(r#"{"command":"set","pin":5,"value":1}"#);

    let mut outcomes = Vec::new();
    for _ in 0..40 {
        if let Some(outcome) = ph.poll(&mut reg, &mut hal) {
            outcomes.push(outcome);
        }
    }
    assert_eq!(outcomes.len(), 2, "{outcomes:?}");
    assert_eq!(outcomes[0], Err(ProtocolError::malformed("line too long")));
    assert_eq!(outcomes[1], Ok(Dispatch::Applied { pin: 5, value: 1 }));
    assert_eq!(
        ph.transport_mut().take_lines(),
        [r#"{"sensor":"error","value":"line too long"}"#]
    );
}

// ── Telemetry path ────────────────────────────────────────────

#[test]
fn telemetry_one_record_per_sensor_in_order() {
    static PULSES: PulseCounter = PulseCounter::new();
    let (mut ph, mut reg, mut hal) = make_board(&PULSES);
    hal.pulse(pins::EXH_FAN_INTERRUPT_PIN, 40);

    let report = ph.emit_telemetry(&mut reg, &mut hal);
    assert_eq!(report.records, 4);

    let lines = ph.transport_mut().take_lines();
    let records: Vec<Value> = lines.iter().map(|l| parse(l)).collect();

    assert_eq!(
        records[0],
        json!({
            "sensor": "dt", "label": "Temperature", "value": 24.0, "unit": "C",
            "controls": [{"pin": 6, "type": "analog", "device": "exhaust_fan"}]
        })
    );
    assert_eq!(
        records[1],
        json!({
            "sensor": "dh", "label": "Humidity", "value": 60.0, "unit": "%",
            "controls": [
                {"pin": 5, "type": "digital", "device": "alarm_light"},
                {"pin": 7, "type": "digital", "device": "humidifier"}
            ]
        })
    );
    assert_eq!(records[2]["sensor"], "ef");
    assert_eq!(records[2]["value"], 1200.0);
    assert_eq!(records[3]["sensor"], "sm");
    assert_eq!(records[3]["value"], 1873.0);
    assert_eq!(
        records[3]["controls"],
        json!([{"pin": 9, "type": "digital", "device": "water_pump"}])
    );
}

#[test]
fn probe_failure_yields_null_values_only_for_climate() {
    static PULSES: PulseCounter = PulseCounter::new();
    let (mut ph, mut reg, mut hal) = make_board(&PULSES);
    hal.climate = Err(zucchini::error::HalError::Timeout);

    let report = ph.emit_telemetry(&mut reg, &mut hal);
    assert_eq!(report.records, 4);
    let ids: Vec<_> = report.faults.iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, ["dt", "dh"]);

    let records: Vec<Value> = ph.transport_mut().take_lines().iter().map(|l| parse(l)).collect();
    assert!(records[0]["value"].is_null());
    assert!(records[1]["value"].is_null());
    assert_eq!(records[2]["value"], 0.0);
    assert_eq!(records[3]["value"], 1873.0);
}

#[test]
fn write_failure_does_not_block_other_sensors() {
    static PULSES: PulseCounter = PulseCounter::new();
    let (mut ph, mut reg, mut hal) = make_board(&PULSES);
    ph.transport_mut().fail_write = Some(1);

    let report = ph.emit_telemetry(&mut reg, &mut hal);
    assert_eq!(report.records, 3);
    assert_eq!(report.write_failures, 1);

    let ids: Vec<String> = ph
        .transport_mut()
        .take_lines()
        .iter()
        .map(|l| parse(l)["sensor"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(ids, ["dt", "ef", "sm"]);
}

#[test]
fn telemetry_before_start_reports_every_sensor_as_not_started() {
    static PULSES: PulseCounter = PulseCounter::new();
    let mut reg = board::build_registry(&SystemConfig::default(), &PULSES).unwrap();
    let mut hal = MockHal::new();
    hal.set_analog(pins::SOIL_MOISTURE_PIN, 1873);
    let mut ph = ProtocolHandler::new(MemoryTransport::new(), 256);

    let report = ph.emit_telemetry(&mut reg, &mut hal);
    assert_eq!(report.records, 4);
    assert!(
        report
            .faults
            .iter()
            .all(|&(_, error)| error == SensorError::NotStarted)
    );
    assert_eq!(report.faults.len(), 4);
    assert!(hal.calls.is_empty(), "no device touched before begin_all");

    let records: Vec<Value> = ph.transport_mut().take_lines().iter().map(|l| parse(l)).collect();
    assert!(records.iter().all(|r| r["value"].is_null()));
}
