//! Application core: orchestration and port boundary.
//!
//! [`service::GrowService`] runs one cooperative loop iteration at a time:
//! poll the protocol link, then emit telemetry when the interval elapses.
//! All hardware access goes through the port traits in [`ports`], which
//! keeps this layer testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
