//! Polled, debounced push buttons.
//!
//! ## Hardware
//!
//! Active-low momentary switches with pull-ups.  The control loop polls
//! the pins once per iteration; a level must be stable for
//! [`DEBOUNCE_MS`] before it counts as a press or release.
//!
//! ## Output
//!
//! [`ButtonPoller`] owns the lock and function buttons and posts one
//! mailbox event per debounced edge.  Filtering of which edges matter
//! happens in [`Event::button`].

use embedded_hal::digital::InputPin;
use log::warn;

use crate::events::{ButtonAction, Event, FUNCTION_BUTTON, LOCK_BUTTON, Mailbox};

pub const DEBOUNCE_MS: u64 = 50;

/// One debounced button on an `embedded-hal` input pin.
pub struct DebouncedButton<P> {
    pin: P,
    index: u8,
    pressed: bool,
    candidate: bool,
    candidate_since_ms: u64,
}

impl<P: InputPin> DebouncedButton<P> {
    pub fn new(pin: P, index: u8) -> Self {
        Self {
            pin,
            index,
            pressed: false,
            candidate: false,
            candidate_since_ms: 0,
        }
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    /// Debounced level.
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Sample the pin.  Returns an edge once the new level has been
    /// stable for the debounce time.
    pub fn poll(&mut self, now_ms: u64) -> Option<ButtonAction> {
        let raw = match self.pin.is_low() {
            Ok(level) => level,
            Err(e) => {
                warn!("button {}: gpio read failed: {:?}", self.index, e);
                return None;
            }
        };

        if raw != self.candidate {
            self.candidate = raw;
            self.candidate_since_ms = now_ms;
            return None;
        }

        if raw != self.pressed && now_ms.saturating_sub(self.candidate_since_ms) >= DEBOUNCE_MS {
            self.pressed = raw;
            return Some(if raw {
                ButtonAction::Pressed
            } else {
                ButtonAction::Released
            });
        }
        None
    }
}

/// The lock and function buttons, feeding the mailbox.
pub struct ButtonPoller<'a, L, F> {
    mailbox: &'a Mailbox,
    lock: DebouncedButton<L>,
    function: DebouncedButton<F>,
}

impl<'a, L: InputPin, F: InputPin> ButtonPoller<'a, L, F> {
    pub fn new(mailbox: &'a Mailbox, lock_pin: L, function_pin: F) -> Self {
        Self {
            mailbox,
            lock: DebouncedButton::new(lock_pin, LOCK_BUTTON),
            function: DebouncedButton::new(function_pin, FUNCTION_BUTTON),
        }
    }

    /// Sample both buttons and post any debounced edges.
    pub fn poll(&mut self, now_ms: u64) {
        if let Some(action) = self.lock.poll(now_ms) {
            self.post(LOCK_BUTTON, action);
        }
        if let Some(action) = self.function.poll(now_ms) {
            self.post(FUNCTION_BUTTON, action);
        }
    }

    fn post(&self, index: u8, action: ButtonAction) {
        if let Some(event) = Event::button(index, action) {
            self.mailbox.post(event);
        }
    }
}
