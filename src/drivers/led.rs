//! Single-colour indicator LED with steady and blink modes.
//!
//! The widget owns an `embedded-hal` output pin.  `set()` and `blink()`
//! only record the requested mode; the control loop calls `animate(now)`
//! once per iteration to toggle the pin when the current phase expires.
//!
//! ## Phase alignment
//!
//! `set()` clears the blink timing and the last-change timestamp.  Two
//! widgets that are both `set(false)` and then given the same blink
//! period therefore toggle on the same `animate()` call and stay in
//! lock-step.
//!
//! ## Dual-target design
//!
//! On ESP-IDF the pin is an `esp-idf-hal` `PinDriver`; on host/test any
//! `OutputPin` (usually a mock that records its level) is used.

use embedded_hal::digital::OutputPin;
use log::warn;

/// Desired LED output, as produced by the LED policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedPattern {
    /// Constant on (`true`) or off (`false`).
    Steady(bool),
    /// Periodic on/off with independent phase lengths.
    Blink { on_ms: u32, off_ms: u32 },
}

pub struct LedWidget<P> {
    pin: P,
    state: bool,
    blink_on_ms: u32,
    blink_off_ms: u32,
    last_change_ms: u64,
}

impl<P: OutputPin> LedWidget<P> {
    /// Wrap `pin`; the LED starts off.
    pub fn new(pin: P) -> Self {
        let mut led = Self {
            pin,
            state: false,
            blink_on_ms: 0,
            blink_off_ms: 0,
            last_change_ms: 0,
        };
        led.write(false);
        led
    }

    /// Steady on/off.  Cancels any blink and resets the blink phase.
    pub fn set(&mut self, on: bool) {
        self.blink_on_ms = 0;
        self.blink_off_ms = 0;
        self.last_change_ms = 0;
        self.write(on);
    }

    /// Symmetric blink.
    pub fn blink(&mut self, change_rate_ms: u32) {
        self.blink_with(change_rate_ms, change_rate_ms);
    }

    /// Blink with separate on and off durations.
    ///
    /// Re-requesting the current timing keeps the running phase.
    pub fn blink_with(&mut self, on_ms: u32, off_ms: u32) {
        self.blink_on_ms = on_ms;
        self.blink_off_ms = off_ms;
    }

    pub fn apply(&mut self, pattern: LedPattern) {
        match pattern {
            LedPattern::Steady(on) => self.set(on),
            LedPattern::Blink { on_ms, off_ms } => self.blink_with(on_ms, off_ms),
        }
    }

    /// Advance the blink animation.  Call once per loop iteration.
    pub fn animate(&mut self, now_ms: u64) {
        if self.blink_on_ms == 0 || self.blink_off_ms == 0 {
            return;
        }
        let phase_ms = if self.state {
            self.blink_on_ms
        } else {
            self.blink_off_ms
        };
        if now_ms > self.last_change_ms + u64::from(phase_ms) {
            self.write(!self.state);
            self.last_change_ms = now_ms;
        }
    }

    /// Current pin level.
    pub fn is_on(&self) -> bool {
        self.state
    }

    /// Current mode as a pattern.
    pub fn pattern(&self) -> LedPattern {
        if self.blink_on_ms == 0 || self.blink_off_ms == 0 {
            LedPattern::Steady(self.state)
        } else {
            LedPattern::Blink {
                on_ms: self.blink_on_ms,
                off_ms: self.blink_off_ms,
            }
        }
    }

    pub fn pin(&self) -> &P {
        &self.pin
    }

    fn write(&mut self, on: bool) {
        let res = if on {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        if let Err(e) = res {
            warn!("led: gpio write failed: {:?}", e);
        }
        self.state = on;
    }
}
