//! Device adapter: bundles every port the control task drives.
//!
//! Owns the function timer, the bolt actuator, the trait sink, the update
//! manager, the configuration manager and the clock, and exposes them
//! through the port traits so [`AppTask`] can take a single
//! `&mut impl Platform`.  On non-espidf targets the timer, actuator and
//! configuration manager use their simulation stubs.
//!
//! [`AppTask`]: crate::app::task::AppTask

use crate::app::lock::{ActorMethod, LockAction};
use crate::app::ports::{
    Clock, DevicePort, FirmwareRevision, FunctionTimer, LockActuator, LockTraitSink, UpdateControl,
};
use crate::config::AppConfig;
use crate::drivers::hw_timer::OneShotTimer;
use crate::error::{Error, Result, TimerError};
use crate::events::Mailbox;
use crate::update::{SoftwareUpdateHandler, UpdateError};

use super::bolt_lock::SimulatedBoltLock;
use super::device_config::DeviceConfig;
use super::log_sink::LogTraitSink;
use super::time::MonotonicClock;
use super::update_manager::SimUpdateManager;

pub struct DeviceAdapter {
    timer: OneShotTimer,
    bolt: SimulatedBoltLock,
    sink: LogTraitSink,
    updates: SimUpdateManager<'static>,
    device: DeviceConfig,
    clock: MonotonicClock,
}

impl DeviceAdapter {
    /// Create every collaborator.  Any failure is a startup precondition.
    pub fn new(config: &AppConfig, mailbox: &'static Mailbox) -> Result<Self> {
        let timer = OneShotTimer::new(mailbox)?;
        let device = DeviceConfig::new();
        let revision = device.firmware_revision()?;
        let updates = SimUpdateManager::new(SoftwareUpdateHandler::new(mailbox, revision));

        Ok(Self {
            timer,
            bolt: SimulatedBoltLock::new(config.actuator_movement_ms),
            sink: LogTraitSink::new(),
            updates,
            device,
            clock: MonotonicClock::new(),
        })
    }

    /// Let the timer and update manager run their own work.  Call once
    /// per control loop iteration.
    pub fn service(&mut self) {
        self.timer.poll();
        self.updates.service();
    }

    pub fn updates(&self) -> &SimUpdateManager<'static> {
        &self.updates
    }

    pub fn trait_sink(&self) -> &LogTraitSink {
        &self.sink
    }
}

// ── FunctionTimer ─────────────────────────────────────────────

impl FunctionTimer for DeviceAdapter {
    fn start(&mut self, timeout_ms: u32) -> core::result::Result<(), TimerError> {
        self.timer.start(timeout_ms)
    }

    fn stop(&mut self) -> core::result::Result<(), TimerError> {
        self.timer.stop()
    }

    fn is_active(&self) -> bool {
        self.timer.is_active()
    }
}

// ── LockActuator / LockTraitSink ──────────────────────────────

impl LockActuator for DeviceAdapter {
    fn is_unlocked(&self) -> bool {
        self.bolt.is_unlocked()
    }

    fn begin(&mut self, action: LockAction, now_ms: u64) {
        self.bolt.begin(action, now_ms);
    }

    fn poll_completed(&mut self, now_ms: u64) -> Option<LockAction> {
        self.bolt.poll_completed(now_ms)
    }
}

impl LockTraitSink for DeviceAdapter {
    fn initiate_lock(&mut self, actor: ActorMethod) {
        self.sink.initiate_lock(actor);
    }

    fn initiate_unlock(&mut self, actor: ActorMethod) {
        self.sink.initiate_unlock(actor);
    }

    fn locking_successful(&mut self) {
        self.sink.locking_successful();
    }

    fn unlocking_successful(&mut self) {
        self.sink.unlocking_successful();
    }
}

// ── UpdateControl ─────────────────────────────────────────────

impl UpdateControl for DeviceAdapter {
    fn is_in_progress(&self) -> bool {
        self.updates.is_in_progress()
    }

    fn abort(&mut self) {
        self.updates.abort();
    }

    fn check_now(&mut self) {
        self.updates.check_now();
    }

    fn image_install_complete(&mut self, result: core::result::Result<(), UpdateError>) {
        self.updates.image_install_complete(result);
    }

    fn set_query_interval_window(&mut self, min_ms: u32, max_ms: u32) {
        self.updates.set_query_interval_window(min_ms, max_ms);
    }
}

// ── DevicePort / Clock ────────────────────────────────────────

impl DevicePort for DeviceAdapter {
    fn firmware_revision(&self) -> core::result::Result<FirmwareRevision, Error> {
        self.device.firmware_revision()
    }

    fn initiate_factory_reset(&mut self) {
        self.device.initiate_factory_reset();
    }
}

impl Clock for DeviceAdapter {
    fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }
}
