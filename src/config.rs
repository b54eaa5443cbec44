//! System configuration parameters
//!
//! All tunable timing parameters for the lock application.  Defaults are
//! used at boot; persisting a changed configuration is handled by the
//! device configuration store, not by this crate.

use serde::{Deserialize, Serialize};

/// Capacity of the application event mailbox.  Sizes a static buffer, so
/// it is a constant rather than a runtime setting.
pub const MAILBOX_CAPACITY: usize = 10;

/// Core application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    // --- Function button ---
    /// Hold time before a press turns into an armed factory reset (ms).
    pub factory_reset_trigger_timeout_ms: u32,
    /// Window after arming in which a release cancels the reset (ms).
    pub factory_reset_cancel_window_ms: u32,
    /// Blink period of both LEDs while a factory reset is armed (ms).
    pub factory_reset_blink_ms: u32,

    // --- Event loop ---
    /// Maximum time the loop waits on an empty mailbox (ms).
    pub loop_poll_interval_ms: u32,

    // --- Lock actuator ---
    /// Time the bolt takes to travel between locked and unlocked (ms).
    pub actuator_movement_ms: u32,

    // --- Software update ---
    /// Lower bound of the periodic update-query window (ms).
    pub swu_interval_window_min_ms: u32,
    /// Upper bound of the periodic update-query window (ms).
    pub swu_interval_window_max_ms: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            // Function button
            factory_reset_trigger_timeout_ms: 3000,
            factory_reset_cancel_window_ms: 3000,
            factory_reset_blink_ms: 500,

            // Event loop
            loop_poll_interval_ms: 10,

            // Lock actuator
            actuator_movement_ms: 2000,

            // Software update
            swu_interval_window_min_ms: 23 * 60 * 60 * 1000, // 23 h
            swu_interval_window_max_ms: 24 * 60 * 60 * 1000, // 24 h
        }
    }
}

impl AppConfig {
    /// Check the cross-field invariants.
    pub fn validate(&self) -> crate::error::Result<()> {
        use crate::error::Error;

        if self.factory_reset_trigger_timeout_ms == 0 || self.factory_reset_cancel_window_ms == 0 {
            return Err(Error::Config("factory reset timeouts must be non-zero"));
        }
        if self.loop_poll_interval_ms == 0 {
            return Err(Error::Config("loop poll interval must be non-zero"));
        }
        if self.swu_interval_window_min_ms > self.swu_interval_window_max_ms {
            return Err(Error::Config("update query window min exceeds max"));
        }
        Ok(())
    }
}
