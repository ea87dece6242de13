//! Peripheral helpers over raw ESP-IDF sys calls.
//!
//! GPIO outputs, LEDC PWM channels, ADC1 one-shot conversions and the
//! per-pin GPIO ISR service.  [`EspHardware`](crate::adapters::hardware::EspHardware)
//! is the only caller; everything here runs from the single main task
//! except the ISR trampoline.
//!
//! On non-espidf targets only the pure helpers (error type, pin → ADC
//! channel mapping) are compiled.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
#[cfg(target_os = "espidf")]
use log::info;

#[cfg(target_os = "espidf")]
use crate::sensors::pulse::PulseCounter;

// ── Error type ────────────────────────────────────────────────

/// Errors from peripheral configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HwInitError {
    AdcInitFailed(i32),
    AdcReadFailed(i32),
    GpioConfigFailed(i32),
    LedcInitFailed(i32),
    IsrInstallFailed(i32),
    NoLedcChannel,
}

impl core::fmt::Display for HwInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AdcInitFailed(rc)    => write!(f, "ADC1 init failed (rc={})", rc),
            Self::AdcReadFailed(rc)    => write!(f, "ADC1 read failed (rc={})", rc),
            Self::GpioConfigFailed(rc) => write!(f, "GPIO config failed (rc={})", rc),
            Self::LedcInitFailed(rc)   => write!(f, "LEDC timer/channel config failed (rc={})", rc),
            Self::IsrInstallFailed(rc) => write!(f, "GPIO ISR setup failed (rc={})", rc),
            Self::NoLedcChannel        => write!(f, "no free LEDC channel"),
        }
    }
}

impl From<HwInitError> for crate::error::HalError {
    fn from(e: HwInitError) -> Self {
        match e {
            HwInitError::AdcInitFailed(rc)
            | HwInitError::AdcReadFailed(rc)
            | HwInitError::GpioConfigFailed(rc)
            | HwInitError::LedcInitFailed(rc)
            | HwInitError::IsrInstallFailed(rc) => Self::Driver(rc),
            HwInitError::NoLedcChannel => Self::Driver(-1),
        }
    }
}

/// Low-speed LEDC channels available to PWM controls.
pub const LEDC_CHANNELS: u8 = 8;

/// ADC1 channel wired to `gpio` on the ESP32-S3 (GPIO1..=GPIO10 → CH0..=CH9).
pub const fn adc1_channel_for(gpio: u8) -> Option<u32> {
    match gpio {
        1..=10 => Some(gpio as u32 - 1),
        _ => None,
    }
}

#[cfg(target_os = "espidf")]
fn check(ret: esp_err_t, err: fn(i32) -> HwInitError) -> Result<(), HwInitError> {
    if ret == ESP_OK { Ok(()) } else { Err(err(ret)) }
}

// ── GPIO outputs ──────────────────────────────────────────────

/// Configure `pin` as a push-pull output, driven low.
#[cfg(target_os = "espidf")]
pub fn configure_output(pin: u8) -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_OUTPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_DISABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_DISABLE,
    };
    // SAFETY: plain register configuration of a pin from the pin map;
    // main task only.
    check(unsafe { gpio_config(&cfg) }, HwInitError::GpioConfigFailed)?;
    unsafe { gpio_set_level(i32::from(pin), 0) };
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: u8, high: bool) {
    // SAFETY: gpio_set_level writes to an already-configured output pin.
    unsafe { gpio_set_level(i32::from(pin), u32::from(high)); }
}

// ── LEDC PWM ─────────────────────────────────────────────────

/// Configure `channel` on its own timer at `freq_hz`, 8-bit, duty 0.
#[cfg(target_os = "espidf")]
pub fn configure_pwm(pin: u8, channel: u8, freq_hz: u32) -> Result<(), HwInitError> {
    if channel >= LEDC_CHANNELS {
        return Err(HwInitError::NoLedcChannel);
    }
    // Four timers; channels beyond that share by index.
    let timer = u32::from(channel % 4);
    let timer_cfg = ledc_timer_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        timer_num: ledc_timer_t_LEDC_TIMER_0 + timer,
        duty_resolution: ledc_timer_bit_t_LEDC_TIMER_8_BIT,
        freq_hz,
        clk_cfg: soc_periph_ledc_clk_src_legacy_t_LEDC_AUTO_CLK,
        ..Default::default()
    };
    // SAFETY: called once per PWM control from begin(); main task only.
    check(unsafe { ledc_timer_config(&timer_cfg) }, HwInitError::LedcInitFailed)?;

    let chan_cfg = ledc_channel_config_t {
        speed_mode: ledc_mode_t_LEDC_LOW_SPEED_MODE,
        channel: ledc_channel_t_LEDC_CHANNEL_0 + u32::from(channel),
        timer_sel: ledc_timer_t_LEDC_TIMER_0 + timer,
        gpio_num: i32::from(pin),
        duty: 0,
        hpoint: 0,
        ..Default::default()
    };
    check(unsafe { ledc_channel_config(&chan_cfg) }, HwInitError::LedcInitFailed)?;

    info!("hw_init: LEDC CH{} on GPIO{} at {} Hz", channel, pin, freq_hz);
    Ok(())
}

#[cfg(target_os = "espidf")]
pub fn ledc_set(channel: u8, duty: u8) {
    // SAFETY: channel configured by configure_pwm(); duty register writes
    // are race-free since only the main loop calls this.
    unsafe {
        ledc_set_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, u32::from(channel), u32::from(duty));
        ledc_update_duty(ledc_mode_t_LEDC_LOW_SPEED_MODE, u32::from(channel));
    }
}

// ── ADC (oneshot) ─────────────────────────────────────────────

/// ADC1 one-shot unit, 12-bit, 12 dB attenuation.
#[cfg(target_os = "espidf")]
pub struct Adc1 {
    handle: adc_oneshot_unit_handle_t,
    configured: u16,
}

#[cfg(target_os = "espidf")]
impl Adc1 {
    pub fn new() -> Result<Self, HwInitError> {
        let init_cfg = adc_oneshot_unit_init_cfg_t {
            unit_id: adc_unit_t_ADC_UNIT_1,
            ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
            ..Default::default()
        };
        let mut handle: adc_oneshot_unit_handle_t = core::ptr::null_mut();
        // SAFETY: `handle` outlives the call; unit 1 is claimed once at boot.
        check(
            unsafe { adc_oneshot_new_unit(&init_cfg, &mut handle) },
            HwInitError::AdcInitFailed,
        )?;
        info!("hw_init: ADC1 ready");
        Ok(Self { handle, configured: 0 })
    }

    /// One conversion on `channel`, configuring it on first use.
    pub fn read(&mut self, channel: u32) -> Result<u16, HwInitError> {
        if self.configured & (1 << channel) == 0 {
            let chan_cfg = adc_oneshot_chan_cfg_t {
                atten: adc_atten_t_ADC_ATTEN_DB_12,
                bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
            };
            // SAFETY: handle is valid for the life of self.
            check(
                unsafe { adc_oneshot_config_channel(self.handle, channel, &chan_cfg) },
                HwInitError::AdcInitFailed,
            )?;
            self.configured |= 1 << channel;
        }
        let mut raw: i32 = 0;
        // SAFETY: handle is valid; main task only.
        check(
            unsafe { adc_oneshot_read(self.handle, channel, &mut raw) },
            HwInitError::AdcReadFailed,
        )?;
        Ok(raw.max(0) as u16)
    }
}

// ── GPIO ISR service ──────────────────────────────────────────

#[cfg(target_os = "espidf")]
unsafe extern "C" fn pulse_isr(arg: *mut core::ffi::c_void) {
    // SAFETY: `arg` is the `&'static PulseCounter` registered in
    // attach_pulse_isr(); it lives for the whole program.
    let counter = unsafe { &*(arg as *const PulseCounter) };
    counter.increment();
}

/// Count falling edges on `pin` (input, pull-up) into `counter`.
#[cfg(target_os = "espidf")]
pub fn attach_pulse_isr(pin: u8, counter: &'static PulseCounter) -> Result<(), HwInitError> {
    let cfg = gpio_config_t {
        pin_bit_mask: 1u64 << pin,
        mode: gpio_mode_t_GPIO_MODE_INPUT,
        pull_up_en: gpio_pullup_t_GPIO_PULLUP_ENABLE,
        pull_down_en: gpio_pulldown_t_GPIO_PULLDOWN_DISABLE,
        intr_type: gpio_int_type_t_GPIO_INTR_NEGEDGE,
    };
    // SAFETY: ESP_ERR_INVALID_STATE means the ISR service is already
    // installed, which is fine.  The handler only touches `counter`.
    unsafe {
        check(gpio_config(&cfg), HwInitError::GpioConfigFailed)?;
        let ret = gpio_install_isr_service(0);
        if ret != ESP_OK && ret != ESP_ERR_INVALID_STATE {
            return Err(HwInitError::IsrInstallFailed(ret));
        }
        check(
            gpio_isr_handler_add(
                i32::from(pin),
                Some(pulse_isr),
                counter as *const PulseCounter as *mut core::ffi::c_void,
            ),
            HwInitError::IsrInstallFailed,
        )?;
        check(gpio_intr_enable(i32::from(pin)), HwInitError::IsrInstallFailed)?;
    }
    info!("hw_init: pulse ISR on GPIO{} (falling edge)", pin);
    Ok(())
}
