//! Grow-box controller firmware: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │                                                              │
//! │  EspHardware / SimHardware   StdioTransport   LogEventSink   │
//! │  (Hal)                       (Transport)      (EventSink)    │
//! │                                                              │
//! │  ─────────────── Port Trait Boundary ──────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │  GrowService: Registry · ProtocolHandler · Interval    │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! One cooperative loop: poll the serial link, emit telemetry when due,
//! feed the watchdog, yield.  The tach ISR is the only other context.

use std::time::Duration;

use anyhow::{Context, Result};
use log::info;

use zucchini::adapters::log_sink::LogEventSink;
use zucchini::adapters::serial::StdioTransport;
use zucchini::adapters::time::MonotonicClock;
use zucchini::app::service::GrowService;
use zucchini::board;
use zucchini::config::SystemConfig;
use zucchini::drivers::watchdog::Watchdog;

/// Idle time between loop iterations.
const LOOP_YIELD: Duration = Duration::from_millis(5);

fn main() -> Result<()> {
    // ── 1. Platform bootstrap ─────────────────────────────────
    #[cfg(target_os = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }

    info!("zucchini v{} starting", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let config = SystemConfig::default();
    config.validate().context("invalid configuration")?;

    // ── 3. Hardware ───────────────────────────────────────────
    #[cfg(target_os = "espidf")]
    let mut hal = zucchini::adapters::hardware::EspHardware::new(
        zucchini::pins::DHT_PIN,
        zucchini::pins::DHT_TYPE,
    )
    .context("hardware init failed")?;

    #[cfg(not(target_os = "espidf"))]
    let mut hal = {
        // Host run: a bench-top climate and a half-wet pot.
        let mut sim = zucchini::adapters::hardware::SimHardware::new();
        sim.set_climate(Ok((22.5, 55.0)));
        sim.set_analog(zucchini::pins::SOIL_MOISTURE_PIN, 2048);
        sim
    };

    // ── 4. Composition root ───────────────────────────────────
    let registry =
        board::build_registry(&config, &board::FAN_PULSES).context("device table rejected")?;
    let transport = StdioTransport::spawn(config.serial_baud).context("serial link")?;

    let clock = MonotonicClock::new();
    let mut sink = LogEventSink::new();
    let mut service = GrowService::new(&config, registry, transport);
    service.start(clock.uptime_ms(), &mut hal, &mut sink);

    let mut watchdog = Watchdog::arm(config.watchdog_timeout_ms, clock.uptime_ms());

    // ── 5. Control loop ───────────────────────────────────────
    loop {
        let now_ms = clock.uptime_ms();
        service.poll(now_ms, &mut hal, &mut sink);
        watchdog.feed(now_ms);

        #[cfg(not(target_os = "espidf"))]
        {
            if service.transport().is_closed() {
                info!(
                    "input closed after {} commands ({} rejected), {} telemetry cycles",
                    service.commands_applied(),
                    service.commands_rejected(),
                    service.telemetry_cycles()
                );
                return Ok(());
            }
        }

        std::thread::sleep(LOOP_YIELD);
    }
}
