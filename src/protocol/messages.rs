//! Wire shapes of the serial protocol.
//!
//! Inbound:
//! ```text
//! {"command": "<string>", "pin": <int>, "value": <int>}
//! ```
//! Outbound, one line each:
//! ```text
//! {"sensor": "<id>", "label": "<label>", "value": <number|null>, "unit": "<unit>",
//!  "controls": [{"pin": <int>, "type": "<digital|analog>", "device": "<name>"}]}
//! {"sensor": "error", "value": "<message>"}
//! ```

use heapless::Vec;
use serde::Serialize;
use serde_json::Value;

use crate::devices::{ControlInfo, ControlKind};
use crate::error::ProtocolError;
use crate::sensors::{MAX_ASSOCIATED, SensorInfo};

/// Longest command verb kept for logging.
pub const VERB_CAP: usize = 16;

/// A validated inbound command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Verb as sent, truncated to [`VERB_CAP`].  Not interpreted.
    pub verb: heapless::String<VERB_CAP>,
    /// Target pin.  May exceed the `u8` pin space; dispatch rejects it.
    pub pin: u64,
    /// Requested value, saturated to `i32::MAX`.
    pub value: i32,
}

impl Command {
    /// Parse and validate one line.
    ///
    /// Non-JSON text is `MalformedInput`.  A missing or empty `command`, or
    /// a `pin`/`value` that is absent, negative or not an integer, is
    /// `MissingFields`.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        if line.trim().is_empty() {
            return Err(ProtocolError::malformed("empty input"));
        }
        let doc: Value = serde_json::from_str(line).map_err(ProtocolError::malformed)?;

        let verb = doc
            .get("command")
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty());
        let pin = doc.get("pin").and_then(Value::as_u64);
        let value = doc.get("value").and_then(Value::as_u64);

        let (Some(verb), Some(pin), Some(value)) = (verb, pin, value) else {
            return Err(ProtocolError::MissingFields);
        };

        Ok(Self {
            verb: truncated(verb),
            pin,
            value: i32::try_from(value).unwrap_or(i32::MAX),
        })
    }

    pub fn is_set(&self) -> bool {
        self.verb.as_str() == "set"
    }
}

fn truncated<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for ch in s.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// One associated control inside a Telemetry Record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ControlRecord {
    pub pin: u8,
    #[serde(rename = "type")]
    pub kind: ControlKind,
    pub device: &'static str,
}

impl From<ControlInfo> for ControlRecord {
    fn from(info: ControlInfo) -> Self {
        Self {
            pin: info.pin,
            kind: info.kind,
            device: info.name,
        }
    }
}

/// One sensor's reading for one emission cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord<'a> {
    pub sensor: &'a str,
    pub label: &'a str,
    /// `None` when the read failed; serialised as `null`.
    pub value: Option<f32>,
    pub unit: &'a str,
    pub controls: Vec<ControlRecord, MAX_ASSOCIATED>,
}

impl<'a> TelemetryRecord<'a> {
    pub fn new(
        info: &'a SensorInfo,
        value: Option<f32>,
        controls: impl IntoIterator<Item = ControlInfo>,
    ) -> Self {
        Self {
            sensor: info.id,
            label: info.label,
            value,
            unit: info.unit,
            controls: controls
                .into_iter()
                .map(ControlRecord::from)
                .take(MAX_ASSOCIATED)
                .collect(),
        }
    }

    /// Serialise as one newline-terminated line.
    pub fn to_line(&self) -> serde_json::Result<std::vec::Vec<u8>> {
        to_line(self)
    }
}

/// Reply to a rejected command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord<'a> {
    pub sensor: &'static str,
    pub value: &'a str,
}

impl<'a> ErrorRecord<'a> {
    pub fn new(message: &'a str) -> Self {
        Self {
            sensor: "error",
            value: message,
        }
    }

    pub fn to_line(&self) -> serde_json::Result<std::vec::Vec<u8>> {
        to_line(self)
    }
}

fn to_line<T: Serialize>(record: &T) -> serde_json::Result<std::vec::Vec<u8>> {
    let mut out = serde_json::to_vec(record)?;
    out.push(b'\n');
    Ok(out)
}
