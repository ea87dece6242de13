//! Protocol handler: inbound commands and outbound telemetry.
//!
//! Every inbound line runs the same pipeline and keeps no state across
//! lines:
//!
//! 1. **Parse**: JSON into [`Command`]; failure → `MalformedInput`.
//! 2. **Validate**: `command` non-empty, `pin`/`value` non-negative
//!    integers; failure → `"Missing fields"`.
//! 3. **Dispatch**: look the pin up in the registry; absent →
//!    `"No control for pin"`, present → `set_value`.
//!
//! A rejected line gets exactly one Error Record back.  An accepted
//! command gets no reply.

use heapless::Vec;
use log::{debug, warn};

use super::line::LineBuffer;
use super::messages::{Command, ErrorRecord, TelemetryRecord};
use super::transport::Transport;
use crate::app::ports::Hal;
use crate::error::{HalError, ProtocolError, SensorError};
use crate::registry::{HardwareRegistry, MAX_SENSORS};

/// Bytes pulled from the transport per poll.
const READ_CHUNK: usize = 64;

/// Outcome of a command that passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The control accepted the value.
    Applied { pin: u8, value: i32 },
    /// The control exists but its driver refused the write.
    DriverFault { pin: u8, error: HalError },
}

/// What one telemetry cycle produced.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TelemetryReport {
    /// Records successfully written.
    pub records: usize,
    /// Records lost to serialisation or transport errors.
    pub write_failures: usize,
    /// Sensors whose read failed (their record carried `null`).
    pub faults: Vec<(&'static str, SensorError), MAX_SENSORS>,
}

/// Run one line through parse → validate → dispatch.
pub fn handle_line<H: Hal>(
    line: &str,
    registry: &mut HardwareRegistry,
    hal: &mut H,
) -> Result<Dispatch, ProtocolError> {
    let cmd = Command::parse(line)?;
    if !cmd.is_set() {
        debug!("protocol: verb '{}' treated as set", cmd.verb);
    }

    let pin = u8::try_from(cmd.pin).map_err(|_| ProtocolError::UnknownTarget)?;
    match registry.set_control(pin, hal, cmd.value) {
        None => Err(ProtocolError::UnknownTarget),
        Some(Ok(())) => Ok(Dispatch::Applied {
            pin,
            value: cmd.value,
        }),
        Some(Err(error)) => {
            warn!("protocol: write to pin {pin} failed: {error}");
            Ok(Dispatch::DriverFault { pin, error })
        }
    }
}

pub struct ProtocolHandler<T: Transport> {
    transport: T,
    lines: LineBuffer,
}

impl<T: Transport> ProtocolHandler<T> {
    pub fn new(transport: T, max_line_len: usize) -> Self {
        Self {
            transport,
            lines: LineBuffer::new(max_line_len),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Handle at most one complete inbound line.
    ///
    /// Returns `None` when no full line is available; never blocks.  A
    /// rejected line is answered with an Error Record before returning.
    pub fn poll<H: Hal>(
        &mut self,
        registry: &mut HardwareRegistry,
        hal: &mut H,
    ) -> Option<Result<Dispatch, ProtocolError>> {
        if !self.lines.has_line() {
            self.fill();
        }

        let outcome = match self.lines.next_line()? {
            Ok(line) => handle_line(line, registry, hal),
            Err(e) => Err(e),
        };

        if let Err(e) = &outcome {
            self.send_error(e);
        }
        Some(outcome)
    }

    /// Read every sensor in registry order and write one Telemetry Record
    /// per sensor.  A failed read or write affects only that sensor's line.
    pub fn emit_telemetry<H: Hal>(
        &mut self,
        registry: &mut HardwareRegistry,
        hal: &mut H,
    ) -> TelemetryReport {
        let mut report = TelemetryReport::default();

        for index in 0..registry.sensor_count() {
            let Some((info, reading)) = registry.read_sensor(index, hal) else {
                break;
            };
            let value = match reading {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("telemetry: sensor '{}' read failed: {}", info.id, e);
                    // Cannot overflow: one entry per registered sensor.
                    let _ = report.faults.push((info.id, e));
                    None
                }
            };

            let record = TelemetryRecord::new(&info, value, registry.associated_controls(&info));
            match record.to_line() {
                Ok(bytes) if self.write_line(&bytes) => report.records += 1,
                Ok(_) => report.write_failures += 1,
                Err(e) => {
                    warn!("telemetry: sensor '{}' not serialisable: {}", info.id, e);
                    report.write_failures += 1;
                }
            }
        }

        report
    }

    /// Reply to a rejected line.
    pub fn send_error(&mut self, error: &ProtocolError) {
        let message = error.to_string();
        match ErrorRecord::new(&message).to_line() {
            Ok(bytes) => {
                self.write_line(&bytes);
            }
            Err(e) => warn!("protocol: error record not serialisable: {e}"),
        }
    }

    fn write_line(&mut self, bytes: &[u8]) -> bool {
        if let Err(e) = self.transport.send_line(bytes) {
            warn!("protocol: transport write failed: {e:?}");
            return false;
        }
        true
    }

    /// Pull what the transport has into the line buffer.
    fn fill(&mut self) {
        let mut chunk = [0u8; READ_CHUNK];
        let room = chunk.len().min(self.lines.free());
        if room == 0 {
            return;
        }
        match self.transport.read(&mut chunk[..room]) {
            Ok(0) => {}
            Ok(n) => {
                self.lines.feed(&chunk[..n]);
            }
            Err(e) => warn!("protocol: transport read failed: {e:?}"),
        }
    }
}
