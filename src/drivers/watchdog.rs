//! Loop supervision.
//!
//! On the board the control task subscribes to the ESP-IDF Task Watchdog
//! (TWDT), which panics and reboots if the loop goes quiet for longer than
//! `SystemConfig::watchdog_timeout_ms`.  On the host there is no TWDT, so
//! the same gap is measured in software and reported as a warning.
//!
//! Dropping the [`Watchdog`] unsubscribes the task.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;
use log::{info, warn};

pub struct Watchdog {
    timeout_ms: u32,
    last_feed_ms: u32,
    stalls: u32,
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Watchdog {
    /// Arm the watchdog at `now_ms` and subscribe the calling task.
    pub fn arm(timeout_ms: u32, now_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        let subscribed = {
            let cfg = esp_task_wdt_config_t {
                timeout_ms,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            // SAFETY: plain TWDT configuration calls from the control task.
            let ret = unsafe { esp_task_wdt_reconfigure(&cfg) };
            if ret != ESP_OK {
                warn!("watchdog: reconfigure returned {} (already running?)", ret);
            }
            let ret = unsafe { esp_task_wdt_add(core::ptr::null_mut()) };
            if ret != ESP_OK {
                warn!("watchdog: subscribe failed ({})", ret);
            }
            ret == ESP_OK
        };

        info!("watchdog: armed, {} ms timeout", timeout_ms);
        Self {
            timeout_ms,
            last_feed_ms: now_ms,
            stalls: 0,
            #[cfg(target_os = "espidf")]
            subscribed,
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Gaps between feeds that exceeded the timeout.  Only the host build
    /// can observe one; on the board the TWDT resets first.
    pub fn stalls(&self) -> u32 {
        self.stalls
    }

    /// Record that the loop is alive at `now_ms`.
    pub fn feed(&mut self, now_ms: u32) {
        let gap = now_ms.wrapping_sub(self.last_feed_ms);
        if gap > self.timeout_ms {
            self.stalls = self.stalls.saturating_add(1);
            warn!("watchdog: loop stalled for {} ms", gap);
        }
        self.last_feed_ms = now_ms;

        #[cfg(target_os = "espidf")]
        if self.subscribed {
            // SAFETY: the calling task is subscribed.
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }
}

#[cfg(target_os = "espidf")]
impl Drop for Watchdog {
    fn drop(&mut self) {
        if self.subscribed {
            // SAFETY: removes the task added in `arm`.
            unsafe {
                esp_task_wdt_delete(core::ptr::null_mut());
            }
        }
    }
}
