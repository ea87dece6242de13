//! Peripheral drivers: raw ESP-IDF helpers, the DHT probe and the watchdog.

pub mod dht;
pub mod hw_init;
pub mod watchdog;
