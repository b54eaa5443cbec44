//! GPIO pin assignments for the BoltLock board.
//!
//! Single source of truth: `main` claims pins by these numbers rather
//! than hard-coding them.

// ---------------------------------------------------------------------------
// Indicator LEDs (active HIGH)
// ---------------------------------------------------------------------------

/// Connectivity status LED.
pub const STATUS_LED_GPIO: i32 = 4;
/// Lock state LED: on = locked, off = unlocked, fast blink = moving.
pub const LOCK_LED_GPIO: i32 = 5;

// ---------------------------------------------------------------------------
// Buttons (active-low, internal pull-up)
// ---------------------------------------------------------------------------

/// Lock / unlock toggle.
pub const LOCK_BUTTON_GPIO: i32 = 6;
/// Short press: update check.  Long press: factory reset.
pub const FUNCTION_BUTTON_GPIO: i32 = 7;
