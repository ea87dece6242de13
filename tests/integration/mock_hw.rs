//! Mock adapters for integration tests.
//!
//! `MockHal` records every hardware call so tests can assert on the full
//! history (boot order, which pins were driven) without real GPIO.
//! `MemoryTransport` is an in-memory serial link; `RecordingSink` keeps
//! every emitted event.

use std::collections::{HashMap, VecDeque};

use embedded_hal::digital::PinState;
use zucchini::app::events::AppEvent;
use zucchini::app::ports::{EventSink, Hal};
use zucchini::error::HalError;
use zucchini::protocol::Transport;
use zucchini::sensors::pulse::PulseCounter;

// ── Hardware call record ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum HalCall {
    ConfigureOutput(u8),
    ConfigurePwm { pin: u8, freq_hz: u32 },
    SetDigital { pin: u8, state: PinState },
    SetPwm { pin: u8, duty: u8 },
    ReadAnalog(u8),
    BeginClimateProbe,
    ReadClimate,
    AttachPulseCounter(u8),
}

// ── MockHal ───────────────────────────────────────────────────

pub struct MockHal {
    pub calls: Vec<HalCall>,
    pub climate: Result<(f32, f32), HalError>,
    analog: HashMap<u8, u16>,
    pulses: HashMap<u8, &'static PulseCounter>,
    failing: Vec<u8>,
}

#[allow(dead_code)]
impl MockHal {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            climate: Ok((24.0, 60.0)),
            analog: HashMap::new(),
            pulses: HashMap::new(),
            failing: Vec::new(),
        }
    }

    pub fn set_analog(&mut self, pin: u8, raw: u16) {
        self.analog.insert(pin, raw);
    }

    /// Make every write to `pin` fail with a driver error.
    pub fn fail_writes_on(&mut self, pin: u8) {
        self.failing.push(pin);
    }

    pub fn pulse(&self, pin: u8, edges: u16) {
        if let Some(counter) = self.pulses.get(&pin) {
            for _ in 0..edges {
                counter.increment();
            }
        }
    }

    /// Output writes (digital or PWM) recorded so far.
    pub fn writes(&self) -> Vec<&HalCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, HalCall::SetDigital { .. } | HalCall::SetPwm { .. }))
            .collect()
    }

    /// Last level driven on a digital pin.
    pub fn level(&self, pin: u8) -> Option<PinState> {
        self.calls.iter().rev().find_map(|c| match c {
            HalCall::SetDigital { pin: p, state } if *p == pin => Some(*state),
            HalCall::ConfigureOutput(p) if *p == pin => Some(PinState::Low),
            _ => None,
        })
    }

    /// Last duty driven on a PWM pin.
    pub fn duty(&self, pin: u8) -> Option<u8> {
        self.calls.iter().rev().find_map(|c| match c {
            HalCall::SetPwm { pin: p, duty } if *p == pin => Some(*duty),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    fn check(&self, pin: u8) -> Result<(), HalError> {
        if self.failing.contains(&pin) {
            Err(HalError::Driver(-1))
        } else {
            Ok(())
        }
    }
}

impl Default for MockHal {
    fn default() -> Self {
        Self::new()
    }
}

impl Hal for MockHal {
    fn configure_output(&mut self, pin: u8) -> Result<(), HalError> {
        self.calls.push(HalCall::ConfigureOutput(pin));
        Ok(())
    }

    fn configure_pwm(&mut self, pin: u8, freq_hz: u32) -> Result<(), HalError> {
        self.calls.push(HalCall::ConfigurePwm { pin, freq_hz });
        Ok(())
    }

    fn set_digital(&mut self, pin: u8, state: PinState) -> Result<(), HalError> {
        self.check(pin)?;
        self.calls.push(HalCall::SetDigital { pin, state });
        Ok(())
    }

    fn set_pwm(&mut self, pin: u8, duty: u8) -> Result<(), HalError> {
        self.check(pin)?;
        self.calls.push(HalCall::SetPwm { pin, duty });
        Ok(())
    }

    fn read_analog(&mut self, pin: u8) -> Result<u16, HalError> {
        self.calls.push(HalCall::ReadAnalog(pin));
        self.analog.get(&pin).copied().ok_or(HalError::UnsupportedPin(pin))
    }

    fn begin_climate_probe(&mut self) -> Result<(), HalError> {
        self.calls.push(HalCall::BeginClimateProbe);
        Ok(())
    }

    fn read_temperature_humidity(&mut self) -> Result<(f32, f32), HalError> {
        self.calls.push(HalCall::ReadClimate);
        self.climate
    }

    fn attach_pulse_counter(
        &mut self,
        pin: u8,
        counter: &'static PulseCounter,
    ) -> Result<(), HalError> {
        self.calls.push(HalCall::AttachPulseCounter(pin));
        self.pulses.insert(pin, counter);
        Ok(())
    }
}

// ── MemoryTransport ───────────────────────────────────────────

#[derive(Default)]
pub struct MemoryTransport {
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    writes: usize,
    /// Zero-based index of the write that fails, if any.
    pub fail_write: Option<usize>,
}

#[allow(dead_code)]
impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one inbound line (newline appended).
    pub fn send_line(&mut self, line: &str) {
        self.rx.extend(line.as_bytes());
        self.rx.push_back(b'\n');
    }

    pub fn send_raw(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes);
    }

    /// Drain everything written so far, split into lines.
    pub fn take_lines(&mut self) -> Vec<String> {
        let out = String::from_utf8(std::mem::take(&mut self.tx)).expect("utf-8 output");
        out.lines().map(str::to_owned).collect()
    }
}

impl Transport for MemoryTransport {
    type Error = &'static str;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let n = buf.len().min(self.rx.len());
        for (slot, byte) in buf.iter_mut().zip(self.rx.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        let index = self.writes;
        self.writes += 1;
        if self.fail_write == Some(index) {
            return Err("link dropped");
        }
        self.tx.extend_from_slice(data);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}
