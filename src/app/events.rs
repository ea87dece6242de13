//! Outbound application events.
//!
//! The [`GrowService`](super::service::GrowService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.  Adapters on the other
//! side decide what to do with them (serial log, test recorder).

use crate::error::{ProtocolError, SensorError};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Devices were initialised and the loop is about to run.
    Started { controls: usize, sensors: usize },

    /// A command was dispatched to a control.
    CommandApplied { pin: u8, value: i32 },

    /// A command line was rejected and an Error Record sent.
    CommandRejected(ProtocolError),

    /// One telemetry cycle finished.
    TelemetryEmitted { records: usize, write_failures: usize },

    /// A sensor read failed during telemetry; its record carried `null`.
    SensorFault { id: &'static str, error: SensorError },
}
