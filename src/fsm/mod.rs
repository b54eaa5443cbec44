//! Function-button state machine.
//!
//! One physical button is multiplexed between "check for a software
//! update" (short press) and "factory reset" (long press and hold):
//!
//! ```text
//!                 press                    timer                    timer
//!  NoneSelected ────────▶ SoftwareUpdate ────────▶ FactoryReset ────────▶ reset
//!       ▲                 Pending  │               (armed)  │          committed
//!       │     release: check/abort │                        │
//!       ├──────────────────────────┘                        │
//!       │     release: cancel reset                         │
//!       └───────────────────────────────────────────────────┘
//! ```
//!
//! The machine is pure: each input returns a [`FunctionCommand`] that the
//! control task applies to the timer, LEDs, update manager and
//! configuration manager.  It also tracks whether the function timer is
//! armed so that a stale expiry (queued before a release cancelled it)
//! is ignored.

use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionState {
    NoneSelected,
    SoftwareUpdatePending,
    FactoryReset,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionCommand {
    /// Input had no effect in the current state.
    Ignore,
    /// Arm the function timer for the trigger timeout.
    StartTimer(u32),
    /// Cancel the timer, then abort the running update or start a check.
    CheckForUpdate,
    /// Re-arm the timer for the cancel window and start the reset blink.
    ArmFactoryReset(u32),
    /// Cancel the timer and restore the lock LED.
    CancelFactoryReset,
    /// Cancel window elapsed with the button held: erase the device.
    CommitFactoryReset,
}

#[derive(Debug)]
pub struct FunctionButton {
    state: FunctionState,
    timer_armed: bool,
    trigger_timeout_ms: u32,
    cancel_window_ms: u32,
}

impl FunctionButton {
    pub fn new(trigger_timeout_ms: u32, cancel_window_ms: u32) -> Self {
        Self {
            state: FunctionState::NoneSelected,
            timer_armed: false,
            trigger_timeout_ms,
            cancel_window_ms,
        }
    }

    pub fn state(&self) -> FunctionState {
        self.state
    }

    pub fn timer_armed(&self) -> bool {
        self.timer_armed
    }

    pub fn on_press(&mut self) -> FunctionCommand {
        if self.timer_armed || self.state != FunctionState::NoneSelected {
            return FunctionCommand::Ignore;
        }
        self.enter(FunctionState::SoftwareUpdatePending, true);
        FunctionCommand::StartTimer(self.trigger_timeout_ms)
    }

    pub fn on_release(&mut self) -> FunctionCommand {
        if !self.timer_armed {
            return FunctionCommand::Ignore;
        }
        match self.state {
            FunctionState::SoftwareUpdatePending => {
                self.enter(FunctionState::NoneSelected, false);
                FunctionCommand::CheckForUpdate
            }
            FunctionState::FactoryReset => {
                self.enter(FunctionState::NoneSelected, false);
                FunctionCommand::CancelFactoryReset
            }
            FunctionState::NoneSelected => FunctionCommand::Ignore,
        }
    }

    pub fn on_timer(&mut self) -> FunctionCommand {
        if !self.timer_armed {
            return FunctionCommand::Ignore;
        }
        match self.state {
            FunctionState::SoftwareUpdatePending => {
                self.enter(FunctionState::FactoryReset, true);
                FunctionCommand::ArmFactoryReset(self.cancel_window_ms)
            }
            FunctionState::FactoryReset => {
                // Terminal: the device restarts.  Disarm so nothing can
                // commit a second time.
                self.timer_armed = false;
                FunctionCommand::CommitFactoryReset
            }
            FunctionState::NoneSelected => FunctionCommand::Ignore,
        }
    }

    fn enter(&mut self, next: FunctionState, timer_armed: bool) {
        if next != self.state {
            debug!("function: {:?} -> {:?}", self.state, next);
        }
        self.state = next;
        self.timer_armed = timer_armed;
    }
}
