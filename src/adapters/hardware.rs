//! Hardware adapters: the two implementations of the [`Hal`] port.
//!
//! - [`EspHardware`] (`target_os = "espidf"`) drives real GPIO, LEDC,
//!   ADC1 and the DHT probe through [`crate::drivers`].
//! - [`SimHardware`] keeps every pin in memory.  It backs the host binary
//!   and the tests, and enforces the same preconditions as the real board
//!   (an output must be configured before it is driven, only known analog
//!   pins convert).

use std::collections::BTreeMap;

use embedded_hal::digital::PinState;
use log::debug;

use crate::app::ports::Hal;
use crate::error::HalError;
use crate::sensors::pulse::PulseCounter;

// ═══════════════════════════════════════════════════════════════
//  Simulation
// ═══════════════════════════════════════════════════════════════

/// In-memory board.
#[derive(Default)]
pub struct SimHardware {
    digital: BTreeMap<u8, PinState>,
    pwm: BTreeMap<u8, (u32, u8)>,
    analog: BTreeMap<u8, u16>,
    pulses: BTreeMap<u8, &'static PulseCounter>,
    climate: Option<Result<(f32, f32), HalError>>,
    probe_starts: u32,
}

impl SimHardware {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Observation ───────────────────────────────────────────

    /// Level of a configured digital output.
    pub fn digital(&self, pin: u8) -> Option<PinState> {
        self.digital.get(&pin).copied()
    }

    /// `(freq_hz, duty)` of a configured PWM output.
    pub fn pwm(&self, pin: u8) -> Option<(u32, u8)> {
        self.pwm.get(&pin).copied()
    }

    /// How many times the climate probe was actually brought up.
    pub fn climate_probe_starts(&self) -> u32 {
        self.probe_starts
    }

    // ── Stimulus ──────────────────────────────────────────────

    /// Set what the next climate probe reads return.
    pub fn set_climate(&mut self, reading: Result<(f32, f32), HalError>) {
        self.climate = Some(reading);
    }

    /// Make `pin` an ADC input reading `raw`.
    pub fn set_analog(&mut self, pin: u8, raw: u16) {
        self.analog.insert(pin, raw);
    }

    /// Simulate `edges` falling edges on `pin`.  Ignored unless a pulse
    /// counter is attached there.
    pub fn inject_pulses(&mut self, pin: u8, edges: u16) {
        if let Some(counter) = self.pulses.get(&pin) {
            for _ in 0..edges {
                counter.increment();
            }
        }
    }
}

impl Hal for SimHardware {
    fn configure_output(&mut self, pin: u8) -> Result<(), HalError> {
        self.digital.insert(pin, PinState::Low);
        Ok(())
    }

    fn configure_pwm(&mut self, pin: u8, freq_hz: u32) -> Result<(), HalError> {
        self.pwm.insert(pin, (freq_hz, 0));
        Ok(())
    }

    fn set_digital(&mut self, pin: u8, state: PinState) -> Result<(), HalError> {
        let level = self
            .digital
            .get_mut(&pin)
            .ok_or(HalError::UnsupportedPin(pin))?;
        *level = state;
        Ok(())
    }

    fn set_pwm(&mut self, pin: u8, duty: u8) -> Result<(), HalError> {
        let (_, current) = self.pwm.get_mut(&pin).ok_or(HalError::UnsupportedPin(pin))?;
        *current = duty;
        Ok(())
    }

    fn read_analog(&mut self, pin: u8) -> Result<u16, HalError> {
        self.analog.get(&pin).copied().ok_or(HalError::UnsupportedPin(pin))
    }

    fn begin_climate_probe(&mut self) -> Result<(), HalError> {
        if self.probe_starts == 0 {
            self.probe_starts = 1;
            debug!("sim: climate probe up");
        }
        Ok(())
    }

    fn read_temperature_humidity(&mut self) -> Result<(f32, f32), HalError> {
        self.climate.unwrap_or(Err(HalError::Timeout))
    }

    fn attach_pulse_counter(
        &mut self,
        pin: u8,
        counter: &'static PulseCounter,
    ) -> Result<(), HalError> {
        self.pulses.insert(pin, counter);
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
//  ESP-IDF
// ═══════════════════════════════════════════════════════════════

#[cfg(target_os = "espidf")]
pub use esp::EspHardware;

#[cfg(target_os = "espidf")]
mod esp {
    use embedded_hal::digital::PinState;
    use heapless::LinearMap;
    use log::info;

    use crate::adapters::time::MonotonicClock;
    use crate::app::ports::Hal;
    use crate::drivers::dht::{self, DhtModel, SampleCache};
    use crate::drivers::hw_init::{self, Adc1, HwInitError, LEDC_CHANNELS};
    use crate::error::HalError;
    use crate::sensors::pulse::PulseCounter;

    /// The grow-box board.
    pub struct EspHardware {
        adc: Adc1,
        /// Configured digital outputs, one bit per GPIO.
        outputs: u64,
        /// PWM pin → LEDC channel.
        ledc: LinearMap<u8, u8, { LEDC_CHANNELS as usize }>,
        dht_pin: u8,
        dht_model: DhtModel,
        dht_cache: SampleCache,
        probe_ready: bool,
        clock: MonotonicClock,
    }

    impl EspHardware {
        pub fn new(dht_pin: u8, dht_model: DhtModel) -> crate::error::Result<Self> {
            Ok(Self {
                adc: Adc1::new().map_err(HalError::from)?,
                outputs: 0,
                ledc: LinearMap::new(),
                dht_pin,
                dht_model,
                dht_cache: SampleCache::new(dht_model),
                probe_ready: false,
                clock: MonotonicClock::new(),
            })
        }

        fn is_output(&self, pin: u8) -> bool {
            pin < 64 && self.outputs & (1 << pin) != 0
        }
    }

    impl Hal for EspHardware {
        fn configure_output(&mut self, pin: u8) -> Result<(), HalError> {
            if pin >= 64 {
                return Err(HalError::UnsupportedPin(pin));
            }
            hw_init::configure_output(pin)?;
            self.outputs |= 1 << pin;
            Ok(())
        }

        fn configure_pwm(&mut self, pin: u8, freq_hz: u32) -> Result<(), HalError> {
            let channel = match self.ledc.get(&pin) {
                Some(&ch) => ch,
                None => self.ledc.len() as u8,
            };
            hw_init::configure_pwm(pin, channel, freq_hz)?;
            self.ledc
                .insert(pin, channel)
                .map_err(|_| HwInitError::NoLedcChannel)?;
            Ok(())
        }

        fn set_digital(&mut self, pin: u8, state: PinState) -> Result<(), HalError> {
            if !self.is_output(pin) {
                return Err(HalError::UnsupportedPin(pin));
            }
            hw_init::gpio_write(pin, state == PinState::High);
            Ok(())
        }

        fn set_pwm(&mut self, pin: u8, duty: u8) -> Result<(), HalError> {
            let &channel = self.ledc.get(&pin).ok_or(HalError::UnsupportedPin(pin))?;
            hw_init::ledc_set(channel, duty);
            Ok(())
        }

        fn read_analog(&mut self, pin: u8) -> Result<u16, HalError> {
            let channel = hw_init::adc1_channel_for(pin).ok_or(HalError::UnsupportedPin(pin))?;
            Ok(self.adc.read(channel)?)
        }

        fn begin_climate_probe(&mut self) -> Result<(), HalError> {
            if !self.probe_ready {
                // Line idles high through the pull-up until the first request.
                hw_init::configure_output(self.dht_pin)?;
                hw_init::gpio_write(self.dht_pin, true);
                self.probe_ready = true;
                info!("hw: {:?} probe on GPIO{}", self.dht_model, self.dht_pin);
            }
            Ok(())
        }

        fn read_temperature_humidity(&mut self) -> Result<(f32, f32), HalError> {
            if !self.probe_ready {
                return Err(HalError::UnsupportedPin(self.dht_pin));
            }
            let (pin, model) = (self.dht_pin, self.dht_model);
            let now_ms = self.clock.uptime_ms();
            self.dht_cache.get_or_sample(now_ms, || {
                let frame = dht::read_frame(pin, model)?;
                dht::decode_frame(&frame, model)
            })
        }

        fn attach_pulse_counter(
            &mut self,
            pin: u8,
            counter: &'static PulseCounter,
        ) -> Result<(), HalError> {
            hw_init::attach_pulse_isr(pin, counter)?;
            Ok(())
        }
    }
}
