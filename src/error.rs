//! Unified error types for the grow-box firmware.
//!
//! Protocol and sensor errors never leave the control loop: protocol errors
//! become Error Records on the serial link and sensor errors become `null`
//! telemetry values.  Boot failures (configuration, device table, hardware
//! bring-up) funnel into [`Error`] and abort startup.

use core::fmt;

use heapless::String;

/// Longest diagnostic kept from a JSON parse failure.
pub const DIAGNOSTIC_CAP: usize = 96;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// A failure that stops the firmware from booting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The device table is misconfigured.
    Registry(RegistryError),
    /// The hardware abstraction layer reported a failure.
    Hal(HalError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(e) => write!(f, "registry: {e}"),
            Self::Hal(e) => write!(f, "hal: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl core::error::Error for Error {}

// ---------------------------------------------------------------------------
// Protocol errors
// ---------------------------------------------------------------------------

/// Why an inbound command line produced an Error Record.
///
/// The `Display` output is exactly the `value` string sent to the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The line is not JSON (or not UTF-8, or too long).
    MalformedInput(String<DIAGNOSTIC_CAP>),
    /// `command` absent/empty, or `pin`/`value` absent or negative.
    MissingFields,
    /// No control is registered on the requested pin.
    UnknownTarget,
}

impl ProtocolError {
    /// Build a `MalformedInput` from any displayable diagnostic, truncating
    /// it to [`DIAGNOSTIC_CAP`] bytes on a char boundary.
    pub fn malformed(diagnostic: impl fmt::Display) -> Self {
        let full = diagnostic.to_string();
        let mut msg = String::new();
        for ch in full.chars() {
            if msg.push(ch).is_err() {
                break;
            }
        }
        if msg.is_empty() {
            let _ = msg.push_str("malformed input");
        }
        Self::MalformedInput(msg)
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedInput(msg) => f.write_str(msg),
            Self::MissingFields => f.write_str("Missing fields"),
            Self::UnknownTarget => f.write_str("No control for pin"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The underlying read failed or returned a non-finite value.
    ReadFailed,
    /// A reading was requested before the registry started its devices.
    NotStarted,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadFailed => write!(f, "sensor read failed"),
            Self::NotStarted => write!(f, "sensor not started"),
        }
    }
}

impl From<HalError> for SensorError {
    fn from(_: HalError) -> Self {
        Self::ReadFailed
    }
}

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// Pin 0 is never a valid control address.
    ReservedPin,
    /// Two controls claim the same pin.
    DuplicatePin(u8),
    /// A sensor id is empty.
    EmptyId,
    /// Two sensors share an id.
    DuplicateId(&'static str),
    /// A sensor references a pin with no registered control.
    UnknownControl(u8),
    /// The fixed-capacity table is full.
    CapacityExceeded,
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReservedPin => write!(f, "pin 0 is reserved"),
            Self::DuplicatePin(pin) => write!(f, "pin {pin} registered twice"),
            Self::EmptyId => write!(f, "sensor id must not be empty"),
            Self::DuplicateId(id) => write!(f, "sensor id '{id}' registered twice"),
            Self::UnknownControl(pin) => write!(f, "no control registered on pin {pin}"),
            Self::CapacityExceeded => write!(f, "registry capacity exceeded"),
        }
    }
}

impl From<RegistryError> for Error {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

// ---------------------------------------------------------------------------
// HAL errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// The pin cannot be used for the requested function.
    UnsupportedPin(u8),
    /// The peripheral driver returned an error code.
    Driver(i32),
    /// The climate probe did not answer in time.
    Timeout,
    /// The climate probe frame failed its checksum.
    Checksum,
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedPin(pin) => write!(f, "pin {pin} unsupported for this function"),
            Self::Driver(rc) => write!(f, "driver error (rc={rc})"),
            Self::Timeout => write!(f, "probe timeout"),
            Self::Checksum => write!(f, "probe checksum mismatch"),
        }
    }
}

impl embedded_hal::digital::Error for HalError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

impl From<HalError> for Error {
    fn from(e: HalError) -> Self {
        Self::Hal(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
