//! Indicator, input and timer drivers.

pub mod button;
pub mod hw_timer;
pub mod led;
