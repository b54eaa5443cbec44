//! Unified error types for the BoltLock firmware.
//!
//! A single `Error` enum that every subsystem converts into, so the
//! startup path can funnel all precondition failures into one fatal
//! [`halt`].  All variants are `Copy` so they can be logged and passed
//! around without allocation.
//!
//! Errors inside the control state machines never escalate past a log
//! line; only startup / resource errors reach [`halt`].

use core::fmt;

use log::error;

use crate::update::UpdateError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A startup precondition failed (timer, lock actuator, firmware revision).
    Init(&'static str),
    /// The function timer rejected a command.
    Timer(TimerError),
    /// A software-update callback contract was violated.
    Update(UpdateError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Timer(e) => write!(f, "timer: {e}"),
            Self::Update(e) => write!(f, "update: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Timer errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// The underlying timer could not be allocated.
    CreateFailed(i32),
    /// Start (or period change) was refused.
    StartFailed(i32),
    /// Stop was refused.
    StopFailed(i32),
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateFailed(rc) => write!(f, "create failed (rc={rc})"),
            Self::StartFailed(rc) => write!(f, "start failed (rc={rc})"),
            Self::StopFailed(rc) => write!(f, "stop failed (rc={rc})"),
        }
    }
}

impl From<TimerError> for Error {
    fn from(e: TimerError) -> Self {
        Self::Timer(e)
    }
}

impl From<UpdateError> for Error {
    fn from(e: UpdateError) -> Self {
        Self::Update(e)
    }
}

// ---------------------------------------------------------------------------
// Fatal halt
// ---------------------------------------------------------------------------

/// Log a critical error and park the core forever.
///
/// Used only for startup preconditions; the task watchdog (or a power
/// cycle) is the only way out.
pub fn halt(err: &Error) -> ! {
    error!("!!!!!!!!!!!! App Critical Error: {} !!!!!!!!!!!", err);
    #[allow(clippy::empty_loop)]
    loop {}
}

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
