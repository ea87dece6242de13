//! Line-delimited JSON protocol over the serial link.
//!
//! - [`line`]: newline framing of the raw byte stream
//! - [`messages`]: inbound `Command`, outbound Telemetry / Error Records
//! - [`handler`]: parse → validate → dispatch, and telemetry emission
//! - [`transport`]: the byte channel the handler is generic over

pub mod handler;
pub mod line;
pub mod messages;
pub mod transport;

pub use handler::{Dispatch, ProtocolHandler, TelemetryReport, handle_line};
pub use transport::Transport;
