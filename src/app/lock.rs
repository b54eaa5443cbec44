//! Lock action coordinator.
//!
//! Serialises lock / unlock requests against the bolt actuator: only one
//! action may be in flight.  Initiation and completion are reported to
//! the lock trait data source and reflected on the lock LED:
//!
//! | Phase      | Trait sink                               | Lock LED        |
//! |------------|------------------------------------------|-----------------|
//! | Initiated  | `initiate_lock` / `initiate_unlock`      | 50/50 ms blink  |
//! | Completed  | `locking_/unlocking_successful`          | on / off        |
//!
//! Completion is the only path that returns the LED to a steady state
//! after an action.

use embedded_hal::digital::OutputPin;
use log::info;

use super::ports::{Clock, LockActuator, LockTraitSink};
use crate::drivers::led::LedWidget;

/// In-progress blink of the lock LED while the bolt is moving.
const ACTION_BLINK_MS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockAction {
    Lock,
    Unlock,
}

/// Who initiated a lock action, as published in the bolt-lock trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ActorMethod {
    Other = 1,
    /// Lock button on the device itself.
    Physical = 2,
    KeypadPin = 3,
    LocalImplicit = 4,
    RemoteUserExplicit = 5,
    RemoteUserImplicit = 6,
    RemoteUserOther = 7,
    RemoteDelegate = 8,
    LowPowerShutdown = 9,
    VoiceAssistant = 10,
}

impl ActorMethod {
    /// `true` for actions that did not originate on the device.
    pub fn is_remote(self) -> bool {
        matches!(
            self,
            Self::RemoteUserExplicit
                | Self::RemoteUserImplicit
                | Self::RemoteUserOther
                | Self::RemoteDelegate
                | Self::VoiceAssistant
        )
    }
}

#[derive(Debug, Default)]
pub struct LockCoordinator {
    in_flight: Option<LockAction>,
}

impl LockCoordinator {
    pub fn new() -> Self {
        Self { in_flight: None }
    }

    /// The action currently moving the bolt, if any.
    pub fn in_flight(&self) -> Option<LockAction> {
        self.in_flight
    }

    /// Start `action` unless another one is still in flight.
    ///
    /// Returns `false` without touching the actuator, sink or LED when
    /// busy.
    pub fn initiate_action<H, P>(
        &mut self,
        actor: ActorMethod,
        action: LockAction,
        hw: &mut H,
        lock_led: &mut LedWidget<P>,
    ) -> bool
    where
        H: LockActuator + LockTraitSink + Clock,
        P: OutputPin,
    {
        if self.in_flight.is_some() {
            return false;
        }

        self.in_flight = Some(action);
        let now = hw.now_ms();
        hw.begin(action, now);

        match action {
            LockAction::Lock => {
                hw.initiate_lock(actor);
                info!("Lock Action has been initiated (actor={:?})", actor);
            }
            LockAction::Unlock => {
                hw.initiate_unlock(actor);
                info!("Unlock Action has been initiated (actor={:?})", actor);
            }
        }

        lock_led.blink(ACTION_BLINK_MS);
        true
    }

    /// Collect a finished action from the actuator and publish it.
    ///
    /// Returns the completed action, if one finished.
    pub fn poll_completion<H, P>(&mut self, hw: &mut H, lock_led: &mut LedWidget<P>) -> Option<LockAction>
    where
        H: LockActuator + LockTraitSink + Clock,
        P: OutputPin,
    {
        let now = hw.now_ms();
        let done = hw.poll_completed(now)?;
        self.action_completed(done, hw, lock_led);
        Some(done)
    }

    fn action_completed<H, P>(&mut self, action: LockAction, hw: &mut H, lock_led: &mut LedWidget<P>)
    where
        H: LockTraitSink,
        P: OutputPin,
    {
        self.in_flight = None;
        match action {
            LockAction::Lock => {
                info!("Lock Action has been completed");
                hw.locking_successful();
                lock_led.set(true);
            }
            LockAction::Unlock => {
                info!("Unlock Action has been completed");
                hw.unlocking_successful();
                lock_led.set(false);
            }
        }
    }
}
