//! Application core: control logic with no direct I/O.
//!
//! This module contains the rules of the lock application: the control
//! task, the lock action coordinator and the status LED policy.
//! All interaction with hardware and the networking stack happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod led_policy;
pub mod lock;
pub mod ports;
pub mod task;
