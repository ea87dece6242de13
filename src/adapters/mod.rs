//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements | Connects to                         |
//! |------------|------------|-------------------------------------|
//! | `hardware` | Hal        | ESP32-S3 GPIO/LEDC/ADC/DHT, or sim  |
//! | `log_sink` | EventSink  | `log` facade                        |
//! | `serial`   | Transport  | Console UART / host stdio           |
//! | `time`     | (none)     | ESP32 high-resolution timer         |

pub mod hardware;
pub mod log_sink;
pub mod serial;
pub mod time;
