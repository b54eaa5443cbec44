//! Mock platform for integration tests.
//!
//! Records every port call so tests can assert on the full command
//! history, and simulates time, the one-shot function timer and the
//! bolt movement without touching real hardware.

#![allow(dead_code)]

use core::convert::Infallible;

use boltlock::app::lock::{ActorMethod, LockAction};
use boltlock::app::ports::{
    Clock, DevicePort, FirmwareRevision, FunctionTimer, LockActuator, LockTraitSink, UpdateControl,
};
use boltlock::error::{Error, TimerError};
use boltlock::events::{Event, Mailbox, TimerHandle};
use boltlock::update::UpdateError;
use embedded_hal::digital::{ErrorType, OutputPin};

// ── Port call record ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    TimerStart(u32),
    TimerStop,
    BoltBegin(LockAction),
    InitiateLock(ActorMethod),
    InitiateUnlock(ActorMethod),
    LockingSuccessful,
    UnlockingSuccessful,
    UpdateAbort,
    UpdateCheckNow,
    InstallComplete(Result<(), UpdateError>),
    QueryWindow(u32, u32),
    FactoryReset,
}

// ── MockPlatform ──────────────────────────────────────────────

pub struct MockPlatform<'a> {
    mailbox: &'a Mailbox,
    pub calls: Vec<Call>,
    pub now_ms: u64,
    pub timer_deadline: Option<u64>,
    pub timer_fires: u32,
    pub stop_fails: bool,
    pub unlocked: bool,
    pub movement_ms: u64,
    pub moving: Option<(LockAction, u64)>,
    pub update_in_progress: bool,
    pub revision: &'static str,
}

impl<'a> MockPlatform<'a> {
    pub fn new(mailbox: &'a Mailbox) -> Self {
        Self {
            mailbox,
            calls: Vec::new(),
            now_ms: 0,
            timer_deadline: None,
            timer_fires: 0,
            stop_fails: false,
            unlocked: false,
            movement_ms: 2000,
            moving: None,
            update_in_progress: false,
            revision: "1.0.0",
        }
    }

    /// Move the clock forward, firing the function timer if it expires.
    pub fn advance_to(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
        if let Some(deadline) = self.timer_deadline {
            if now_ms >= deadline {
                self.timer_deadline = None;
                self.timer_fires += 1;
                self.mailbox.post(Event::timer(TimerHandle(1)));
            }
        }
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls.iter().filter(|c| **c == call).count()
    }

    pub fn factory_resets(&self) -> usize {
        self.count(Call::FactoryReset)
    }

    pub fn timer_starts(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::TimerStart(ms) => Some(*ms),
                _ => None,
            })
            .collect()
    }
}

impl FunctionTimer for MockPlatform<'_> {
    fn start(&mut self, timeout_ms: u32) -> Result<(), TimerError> {
        self.calls.push(Call::TimerStart(timeout_ms));
        self.timer_deadline = Some(self.now_ms + u64::from(timeout_ms));
        Ok(())
    }

    fn stop(&mut self) -> Result<(), TimerError> {
        self.calls.push(Call::TimerStop);
        if self.stop_fails {
            return Err(TimerError::StopFailed(-1));
        }
        self.timer_deadline = None;
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.timer_deadline.is_some()
    }
}

impl LockActuator for MockPlatform<'_> {
    fn is_unlocked(&self) -> bool {
        self.unlocked && self.moving.is_none()
    }

    fn begin(&mut self, action: LockAction, now_ms: u64) {
        self.calls.push(Call::BoltBegin(action));
        self.moving = Some((action, now_ms + self.movement_ms));
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

impl LockTraitSink for MockPlatform<'_> {
    fn initiate_lock(&mut self, actor: ActorMethod) {
        self.calls.push(Call::InitiateLock(actor));
    }

    fn initiate_unlock(&mut self, actor: ActorMethod) {
        self.calls.push(Call::InitiateUnlock(actor));
    }

    fn locking_successful(&mut self) {
        self.calls.push(Call::LockingSuccessful);
    }

    fn unlocking_successful(&mut self) {
        self.calls.push(Call::UnlockingSuccessful);
    }
}

impl UpdateControl for MockPlatform<'_> {
    fn is_in_progress(&self) -> bool {
        self.update_in_progress
    }

    fn abort(&mut self) {
        self.calls.push(Call::UpdateAbort);
        self.update_in_progress = false;
    }

    fn check_now(&mut self) {
        self.calls.push(Call::UpdateCheckNow);
    }

    fn image_install_complete(&mut self, result: Result<(), UpdateError>) {
        self.calls.push(Call::InstallComplete(result));
    }

    fn set_query_interval_window(&mut self, min_ms: u32, max_ms: u32) {
        self.calls.push(Call::QueryWindow(min_ms, max_ms));
    }
}

impl DevicePort for MockPlatform<'_> {
    fn firmware_revision(&self) -> Result<FirmwareRevision, Error> {
        if self.revision.is_empty() {
            return Err(Error::Init("firmware revision missing"));
        }
        FirmwareRevision::try_from(self.revision).map_err(|()| Error::Init("firmware revision too long"))
    }

    fn initiate_factory_reset(&mut self) {
        self.calls.push(Call::FactoryReset);
    }
}

impl Clock for MockPlatform<'_> {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }
}

// ── MockPin ───────────────────────────────────────────────────

/// Output pin that remembers its level.
#[derive(Debug, Default)]
pub struct MockPin {
    pub high: bool,
    pub writes: u32,
}

impl ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.high = false;
        self.writes += 1;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.high = true;
        self.writes += 1;
        Ok(())
    }
}
