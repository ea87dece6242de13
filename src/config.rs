//! System configuration parameters
//!
//! Build-time tunables for the grow-box controller.  Pin wiring lives in
//! [`crate::pins`]; nothing here is persisted across power loss.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Shortest accepted watchdog timeout (milliseconds).  One loop iteration
/// (a blocking climate-probe read plus a telemetry burst at 9600 baud)
/// stays well under this.
pub const MIN_WATCHDOG_MS: u32 = 1_000;

/// Core system configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Telemetry ---
    /// Base telemetry period (milliseconds), before the multiplier.
    pub telemetry_base_interval_ms: u32,
    /// Scales the telemetry period.  Also the tachometer sample window in
    /// seconds, so RPM stays correct when the period is stretched.
    pub telemetry_multiplier: u8,

    // --- Serial link ---
    /// UART baud rate of the protocol link.
    pub serial_baud: u32,
    /// Longest accepted inbound line (bytes, excluding the newline).
    pub max_line_len: usize,

    // --- Actuators ---
    /// Exhaust fan PWM carrier frequency (Hz).  25 kHz is the 4-wire fan
    /// standard and is inaudible.
    pub fan_pwm_freq_hz: u32,

    // --- Supervision ---
    /// Task watchdog timeout (milliseconds).
    pub watchdog_timeout_ms: u32,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            // Telemetry
            telemetry_base_interval_ms: 1000, // 1 Hz
            telemetry_multiplier: 1,

            // Serial
            serial_baud: 9600,
            max_line_len: 256,

            // Actuators
            fan_pwm_freq_hz: 25_000,

            // Supervision
            watchdog_timeout_ms: 10_000,
        }
    }
}

impl SystemConfig {
    /// Effective telemetry period in milliseconds.
    pub fn telemetry_interval_ms(&self) -> u32 {
        self.telemetry_base_interval_ms
            .saturating_mul(u32::from(self.telemetry_multiplier))
    }

    /// Reject values the firmware cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.telemetry_base_interval_ms == 0 {
            return Err(Error::Config("telemetry_base_interval_ms must be > 0"));
        }
        if self.telemetry_multiplier == 0 {
            return Err(Error::Config("telemetry_multiplier must be > 0"));
        }
        if self.max_line_len < 16 {
            return Err(Error::Config("max_line_len too small for a command"));
        }
        if self.fan_pwm_freq_hz == 0 {
            return Err(Error::Config("fan_pwm_freq_hz must be > 0"));
        }
        if self.watchdog_timeout_ms < MIN_WATCHDOG_MS {
            return Err(Error::Config("watchdog_timeout_ms shorter than one loop iteration"));
        }
        Ok(())
    }
}
