//! Fuzz target: `FunctionButton`
//!
//! Feeds arbitrary press / release / timer-expiry sequences into the
//! function-button state machine and checks that:
//! - a factory reset is committed at most once
//! - a commit only ever follows an armed reset
//! - the timer is never reported armed while idle
//!
//! cargo fuzz run fuzz_function_button

#![no_main]

use boltlock::fsm::{FunctionButton, FunctionCommand, FunctionState};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut fb = FunctionButton::new(3000, 3000);
    let mut commits = 0u32;

    for &b in data {
        let before = fb.state();
        let cmd = match b % 3 {
            0 => fb.on_press(),
            1 => fb.on_release(),
            _ => fb.on_timer(),
        };

        if cmd == FunctionCommand::CommitFactoryReset {
            assert_eq!(before, FunctionState::FactoryReset);
            commits += 1;
        }
        assert!(commits <= 1, "factory reset committed twice");

        if fb.state() == FunctionState::NoneSelected {
            assert!(!fb.timer_armed());
        }
    }
});
