//! Status LED policy.
//!
//! Pure mapping from a [`ConnectivitySnapshot`] to the status LED
//! pattern.  Rules are evaluated in order and the first match wins:
//!
//! | # | Condition                                                  | Pattern            |
//! |---|------------------------------------------------------------|--------------------|
//! | 1 | fully connected                                            | solid on           |
//! | 2 | provisioned ∧ enabled ∧ paired ∧ (¬attached ∨ ¬fully conn.) | 950 on / 50 off    |
//! | 3 | BLE connection present                                     | 100 on / 100 off   |
//! | 4 | otherwise                                                  | 50 on / 950 off    |
//!
//! The control task does not consult the policy while a factory reset is
//! armed; the reset blink owns both LEDs then.

use crate::connectivity::ConnectivitySnapshot;
use crate::drivers::led::LedPattern;

pub const PATTERN_CONNECTED: LedPattern = LedPattern::Steady(true);
pub const PATTERN_PROVISIONED: LedPattern = LedPattern::Blink { on_ms: 950, off_ms: 50 };
pub const PATTERN_BLE: LedPattern = LedPattern::Blink { on_ms: 100, off_ms: 100 };
pub const PATTERN_IDLE: LedPattern = LedPattern::Blink { on_ms: 50, off_ms: 950 };

pub fn status_pattern(snap: &ConnectivitySnapshot) -> LedPattern {
    let fully_connected = snap.is_fully_connected();

    if fully_connected {
        PATTERN_CONNECTED
    } else if snap.thread_provisioned
        && snap.thread_enabled
        && snap.paired_to_account
        && (!snap.thread_attached || !fully_connected)
    {
        PATTERN_PROVISIONED
    } else if snap.ble_connected {
        PATTERN_BLE
    } else {
        PATTERN_IDLE
    }
}
