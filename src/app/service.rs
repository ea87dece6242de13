//! Application service: the hexagonal core.
//!
//! [`GrowService`] owns the hardware registry, the protocol handler and
//! the telemetry cadence.  All I/O flows through port traits injected at
//! call sites, so the whole loop runs against mock adapters in tests.
//!
//! ```text
//!   Transport ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                 │       GrowService         │
//!         Hal ◀──▶│ Registry · Protocol · ⏱  │
//!                 └──────────────────────────┘
//! ```
//!
//! Scheduling is cooperative: each [`GrowService::poll`] handles at most
//! one inbound line, then emits telemetry if the interval has elapsed,
//! and returns.  Nothing in here blocks except the probe read inside a
//! telemetry cycle.

use log::{info, warn};

use crate::config::SystemConfig;
use crate::error::ProtocolError;
use crate::protocol::{Dispatch, ProtocolHandler, TelemetryReport, Transport};
use crate::registry::HardwareRegistry;
use crate::scheduler::IntervalTimer;

use super::events::AppEvent;
use super::ports::{EventSink, Hal};

/// What one [`GrowService::poll`] did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    /// Result of the inbound line handled this iteration, if any.
    pub command: Option<Result<Dispatch, ProtocolError>>,
    /// Report of the telemetry cycle run this iteration, if any.
    pub telemetry: Option<TelemetryReport>,
}

pub struct GrowService<T: Transport> {
    registry: HardwareRegistry,
    protocol: ProtocolHandler<T>,
    telemetry: IntervalTimer,
    commands_applied: u32,
    commands_rejected: u32,
    telemetry_cycles: u32,
}

impl<T: Transport> GrowService<T> {
    /// Assemble the service.  Devices are not touched until [`start`](Self::start).
    pub fn new(config: &SystemConfig, registry: HardwareRegistry, transport: T) -> Self {
        Self {
            registry,
            protocol: ProtocolHandler::new(transport, config.max_line_len),
            telemetry: IntervalTimer::new(config.telemetry_interval_ms(), 0),
            commands_applied: 0,
            commands_rejected: 0,
            telemetry_cycles: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Start every device and arm the telemetry timer at `now_ms`.
    pub fn start(&mut self, now_ms: u32, hal: &mut impl Hal, sink: &mut impl EventSink) {
        let failures = self.registry.begin_all(hal);
        if failures > 0 {
            warn!("GrowService: {failures} device(s) failed to start");
        }
        self.telemetry.reset(now_ms);
        sink.emit(&AppEvent::Started {
            controls: self.registry.control_count(),
            sensors: self.registry.sensor_count(),
        });
        info!(
            "GrowService started, telemetry every {} ms",
            self.telemetry.interval_ms()
        );
    }

    // ── Per-iteration orchestration ───────────────────────────

    /// One cooperative iteration: at most one command, then telemetry if due.
    pub fn poll(
        &mut self,
        now_ms: u32,
        hal: &mut impl Hal,
        sink: &mut impl EventSink,
    ) -> PollOutcome {
        let command = self.protocol.poll(&mut self.registry, hal);
        match &command {
            Some(Ok(Dispatch::Applied { pin, value })) => {
                self.commands_applied = self.commands_applied.wrapping_add(1);
                sink.emit(&AppEvent::CommandApplied {
                    pin: *pin,
                    value: *value,
                });
            }
            Some(Ok(Dispatch::DriverFault { pin, error })) => {
                warn!("GrowService: pin {pin} rejected the write: {error}");
            }
            Some(Err(e)) => {
                self.commands_rejected = self.commands_rejected.wrapping_add(1);
                sink.emit(&AppEvent::CommandRejected(e.clone()));
            }
            None => {}
        }

        let telemetry = self
            .telemetry
            .poll(now_ms)
            .then(|| self.emit_telemetry(hal, sink));

        PollOutcome { command, telemetry }
    }

    /// Run one telemetry cycle now, regardless of the timer.
    pub fn emit_telemetry(
        &mut self,
        hal: &mut impl Hal,
        sink: &mut impl EventSink,
    ) -> TelemetryReport {
        let report = self.protocol.emit_telemetry(&mut self.registry, hal);
        self.telemetry_cycles = self.telemetry_cycles.wrapping_add(1);

        for &(id, error) in &report.faults {
            sink.emit(&AppEvent::SensorFault { id, error });
        }
        sink.emit(&AppEvent::TelemetryEmitted {
            records: report.records,
            write_failures: report.write_failures,
        });
        report
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn registry(&self) -> &HardwareRegistry {
        &self.registry
    }

    pub fn transport(&self) -> &T {
        self.protocol.transport()
    }

    pub fn transport_mut(&mut self) -> &mut T {
        self.protocol.transport_mut()
    }

    /// Milliseconds until the next telemetry cycle.
    pub fn telemetry_due_in(&self, now_ms: u32) -> u32 {
        self.telemetry.remaining(now_ms)
    }

    pub fn commands_applied(&self) -> u32 {
        self.commands_applied
    }

    pub fn commands_rejected(&self) -> u32 {
        self.commands_rejected
    }

    pub fn telemetry_cycles(&self) -> u32 {
        self.telemetry_cycles
    }
}

// ═══════════════════════════════════════════════════════════════
//  Unit tests
// ═══════════════════════════════════════════════════════════════
