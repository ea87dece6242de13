//! Grow-box controller firmware library.
//!
//! Exposes the device model, registry and serial protocol for the binary
//! and for integration testing.  All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module; everything else
//! builds and runs on the host against [`adapters::hardware::SimHardware`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod board;
pub mod config;
pub mod devices;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod protocol;
pub mod registry;
pub mod scheduler;
pub mod sensors;
