//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Devices / GrowService (domain)
//! ```
//!
//! Driven adapters (the board HAL, event sinks) implement these traits.
//! Devices and the [`GrowService`](super::service::GrowService) consume
//! them via generics, so the domain core never touches hardware directly.

use embedded_hal::digital::PinState;

use crate::error::HalError;
use crate::sensors::pulse::PulseCounter;

// ───────────────────────────────────────────────────────────────
// Hardware port (driven adapter: domain ↔ pins, timers, buses)
// ───────────────────────────────────────────────────────────────

/// Pin-level hardware abstraction.
///
/// Every call is synchronous.  `read_temperature_humidity` may block for
/// the duration of one probe transaction (a few milliseconds); nothing
/// else blocks.
pub trait Hal {
    /// Configure `pin` as a push-pull output, driven low.
    fn configure_output(&mut self, pin: u8) -> Result<(), HalError>;

    /// Configure `pin` as a PWM output at `freq_hz`, duty 0.
    fn configure_pwm(&mut self, pin: u8, freq_hz: u32) -> Result<(), HalError>;

    /// Drive a configured output pin.
    fn set_digital(&mut self, pin: u8, state: PinState) -> Result<(), HalError>;

    /// Set the 8-bit duty of a configured PWM pin.
    fn set_pwm(&mut self, pin: u8, duty: u8) -> Result<(), HalError>;

    /// One-shot ADC conversion of `pin`.
    fn read_analog(&mut self, pin: u8) -> Result<u16, HalError>;

    /// Prepare the shared climate probe.  Idempotent: both the temperature
    /// and humidity sensors call it.
    fn begin_climate_probe(&mut self) -> Result<(), HalError>;

    /// Read `(celsius, relative_humidity_percent)` from the climate probe.
    fn read_temperature_humidity(&mut self) -> Result<(f32, f32), HalError>;

    /// Route falling edges on `pin` to [`PulseCounter::increment`].
    fn attach_pulse_counter(
        &mut self,
        pin: u8,
        counter: &'static PulseCounter,
    ) -> Result<(), HalError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port.  Adapters decide where they go.  Events never go
/// to the protocol link: that carries JSON records only.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
