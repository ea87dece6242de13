//! Fuzz target: `handle_line`
//!
//! Runs arbitrary text through parse → validate → dispatch against the
//! real board table on simulated hardware.  Must never panic, and a
//! rejected line must leave every control untouched.
//!
//! cargo fuzz run fuzz_command_line

#![no_main]

use libfuzzer_sys::fuzz_target;
use zucchini::adapters::hardware::SimHardware;
use zucchini::board;
use zucchini::config::SystemConfig;
use zucchini::devices::Control;
use zucchini::protocol::handle_line;
use zucchini::sensors::pulse::PulseCounter;

static PULSES: PulseCounter = PulseCounter::new();

fuzz_target!(|line: &str| {
    let Ok(mut registry) = board::build_registry(&SystemConfig::default(), &PULSES) else {
        return;
    };
    let mut hal = SimHardware::new();
    registry.begin_all(&mut hal);

    let before: Vec<i32> = registry.all_controls().iter().map(Control::value).collect();
    if handle_line(line, &mut registry, &mut hal).is_err() {
        let after: Vec<i32> = registry.all_controls().iter().map(Control::value).collect();
        assert_eq!(before, after, "rejected line mutated a control");
    }
});
