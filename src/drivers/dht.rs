//! DHT11 / DHT22 single-wire climate probe.
//!
//! Frame: 40 bits, MSB first, as five bytes
//! `[rh_hi, rh_lo, t_hi, t_lo, checksum]` where the checksum is the low
//! byte of the sum of the first four.
//!
//! The probe must not be sampled faster than its minimum interval, and
//! both climate sensors read it in the same telemetry cycle, so results
//! are cached in a [`SampleCache`] and refreshed at most once per
//! interval.  Decoding and caching are plain logic; only the bit-banged
//! transfer is ESP-IDF specific.

use crate::error::HalError;

/// Supported probe variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DhtModel {
    Dht11,
    Dht22,
}

impl DhtModel {
    /// Shortest time between two conversions.
    pub const fn min_interval_ms(self) -> u32 {
        match self {
            Self::Dht11 => 1_000,
            Self::Dht22 => 2_000,
        }
    }

    /// How long the host holds the line low to request a conversion.
    pub const fn start_pulse_us(self) -> u32 {
        match self {
            Self::Dht11 => 20_000,
            Self::Dht22 => 1_100,
        }
    }
}

/// Decode a raw frame into `(celsius, relative_humidity_percent)`.
pub fn decode_frame(frame: &[u8; 5], model: DhtModel) -> Result<(f32, f32), HalError> {
    let sum = frame[..4].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    if sum != frame[4] {
        return Err(HalError::Checksum);
    }

    let (temperature, humidity) = match model {
        DhtModel::Dht11 => {
            let humidity = f32::from(frame[0]) + f32::from(frame[1]) * 0.1;
            let magnitude = f32::from(frame[2]) + f32::from(frame[3] & 0x0f) * 0.1;
            let temperature = if frame[3] & 0x80 != 0 { -magnitude } else { magnitude };
            (temperature, humidity)
        }
        DhtModel::Dht22 => {
            let humidity = f32::from(u16::from_be_bytes([frame[0], frame[1]])) * 0.1;
            let magnitude = f32::from(u16::from_be_bytes([frame[2] & 0x7f, frame[3]])) * 0.1;
            let temperature = if frame[2] & 0x80 != 0 { -magnitude } else { magnitude };
            (temperature, humidity)
        }
    };
    Ok((temperature, humidity))
}

/// Last probe result, reused until the model's minimum interval passes.
#[derive(Debug, Clone, Copy)]
pub struct SampleCache {
    min_interval_ms: u32,
    last: Option<(u32, Result<(f32, f32), HalError>)>,
}

impl SampleCache {
    pub const fn new(model: DhtModel) -> Self {
        Self {
            min_interval_ms: model.min_interval_ms(),
            last: None,
        }
    }

    /// Cached result if fresh, otherwise run `sample` and remember it.
    /// Failures are cached too: retrying early would only fail again.
    pub fn get_or_sample(
        &mut self,
        now_ms: u32,
        sample: impl FnOnce() -> Result<(f32, f32), HalError>,
    ) -> Result<(f32, f32), HalError> {
        if let Some((at, result)) = self.last {
            if now_ms.wrapping_sub(at) < self.min_interval_ms {
                return result;
            }
        }
        let result = sample();
        self.last = Some((now_ms, result));
        result
    }
}

// ── ESP-IDF transfer ──────────────────────────────────────────

/// Bit-banged read of one frame from the probe on `pin`.
#[cfg(target_os = "espidf")]
pub fn read_frame(pin: u8, model: DhtModel) -> Result<[u8; 5], HalError> {
    use esp_idf_svc::sys::*;

    let gpio = i32::from(pin);
    // SAFETY: the probe pin is owned by this driver; main task only.  The
    // transfer runs with interrupts masked so edge timings stay intact.
    unsafe {
        gpio_set_direction(gpio, gpio_mode_t_GPIO_MODE_OUTPUT_OD);
        gpio_set_level(gpio, 0);
        esp_rom_delay_us(model.start_pulse_us());
        gpio_set_level(gpio, 1);
        esp_rom_delay_us(40);
        gpio_set_direction(gpio, gpio_mode_t_GPIO_MODE_INPUT);
        gpio_set_pull_mode(gpio, gpio_pull_mode_t_GPIO_PULLUP_ONLY);
    }

    let mut frame = [0u8; 5];
    let masked = esp_idf_hal::interrupt::free(|| -> Result<(), HalError> {
        // Response: ~80 µs low, ~80 µs high.
        wait_while(gpio, true, 100)?;
        wait_while(gpio, false, 100)?;
        wait_while(gpio, true, 100)?;

        for bit in 0..40 {
            wait_while(gpio, false, 80)?;
            // A 0 bit stays high ~27 µs, a 1 bit ~70 µs.
            let high_us = wait_while(gpio, true, 100)?;
            if high_us > 45 {
                frame[bit / 8] |= 0x80 >> (bit % 8);
            }
        }
        Ok(())
    });
    masked?;
    Ok(frame)
}

/// Spin while `pin` reads `level`; returns the time spent.
#[cfg(target_os = "espidf")]
fn wait_while(gpio: i32, level: bool, timeout_us: u32) -> Result<u32, HalError> {
    use esp_idf_svc::sys::{esp_timer_get_time, gpio_get_level};

    // SAFETY: register read and timer read, both ISR-safe.
    let start = unsafe { esp_timer_get_time() };
    loop {
        let elapsed = (unsafe { esp_timer_get_time() } - start) as u32;
        if (unsafe { gpio_get_level(gpio) } != 0) != level {
            return Ok(elapsed);
        }
        if elapsed > timeout_us {
            return Err(HalError::Timeout);
        }
    }
}
