//! Simulated bolt actuator.
//!
//! The reference board has no motor: an action "moves" for the
//! configured movement time and then completes.  The bolt starts locked.

use log::{debug, warn};

use crate::app::lock::LockAction;
use crate::app::ports::LockActuator;

pub struct SimulatedBoltLock {
    unlocked: bool,
    movement_ms: u32,
    moving: Option<(LockAction, u64)>,
}

impl SimulatedBoltLock {
    pub fn new(movement_ms: u32) -> Self {
        Self {
            unlocked: false,
            movement_ms,
            moving: None,
        }
    }

    pub fn is_moving(&self) -> bool {
        self.moving.is_some()
    }
}

impl LockActuator for SimulatedBoltLock {
    /// `true` only once an unlock has completed and nothing is moving.
    fn is_unlocked(&self) -> bool {
        self.unlocked && !self.is_moving()
    }

    fn begin(&mut self, action: LockAction, now_ms: u64) {
        if self.is_moving() {
            warn!("bolt: {:?} replaces a movement still in progress", action);
        }
        let done_at = now_ms + u64::from(self.movement_ms);
        debug!("bolt: {:?} until t={}ms", action, done_at);
        self.moving = Some((action, done_at));
    }

    fn poll_completed(&mut self, now_ms: u64) -> Option<LockAction> {
        let (action, done_at) = self.moving?;
        if now_ms < done_at {
            return None;
        }
        self.moving = None;
        self.unlocked = action == LockAction::Unlock;
        Some(action)
    }
}
