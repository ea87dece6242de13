//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events through the
//! `log` facade (the ESP-IDF logger on the board, whatever backend the
//! host binary installs otherwise).  The protocol link never sees these.

use log::{debug, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`].
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started { controls, sensors } => {
                info!("START | controls={} sensors={}", controls, sensors);
            }
            AppEvent::CommandApplied { pin, value } => {
                info!("CMD   | pin={} value={}", pin, value);
            }
            AppEvent::CommandRejected(e) => {
                warn!("CMD   | rejected: {}", e);
            }
            AppEvent::TelemetryEmitted {
                records,
                write_failures,
            } => {
                if *write_failures > 0 {
                    warn!("TELEM | records={} write_failures={}", records, write_failures);
                } else {
                    debug!("TELEM | records={}", records);
                }
            }
            AppEvent::SensorFault { id, error } => {
                warn!("FAULT | sensor={} {}", id, error);
            }
        }
    }
}
