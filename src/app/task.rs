//! Control task: the single consumer of the event mailbox.
//!
//! [`AppTask`] owns the function-button state machine, the lock
//! coordinator, the last connectivity snapshot and both indicator LEDs.
//! All I/O goes through the [`Platform`] ports passed into each call.
//!
//! ```text
//!  Mailbox ──▶ ┌────────────────────────────┐ ──▶ FunctionTimer / UpdateControl
//!              │          AppTask            │ ──▶ LockActuator / LockTraitSink
//! Connectivity▶│ FunctionButton · LockCoord  │ ──▶ DevicePort (factory reset)
//!              └────────────────────────────┘ ──▶ status LED / lock LED
//! ```
//!
//! One loop iteration:
//! 1. wait up to the poll interval for an event, then drain the mailbox
//! 2. try to refresh the connectivity snapshot (stale on contention)
//! 3. apply the status LED policy unless a factory reset is armed
//! 4. collect a finished lock action
//! 5. animate both LEDs

use core::time::Duration;

use embedded_hal::digital::OutputPin;
use log::{info, warn};

use crate::config::AppConfig;
use crate::connectivity::ConnectivitySnapshot;
use crate::drivers::led::LedWidget;
use crate::error::Result;
use crate::events::{ButtonAction, Event, EventKind, FUNCTION_BUTTON, Handler, Mailbox};
use crate::fsm::{FunctionButton, FunctionCommand, FunctionState};

use super::led_policy::status_pattern;
use super::lock::{ActorMethod, LockAction, LockCoordinator};
use super::ports::{ConnectivityPort, FirmwareRevision, Platform};

pub struct AppTask<'a, C, S, L> {
    config: AppConfig,
    mailbox: &'a Mailbox,
    connectivity: &'a C,
    function: FunctionButton,
    lock: LockCoordinator,
    snapshot: ConnectivitySnapshot,
    status_led: LedWidget<S>,
    lock_led: LedWidget<L>,
}

impl<'a, C, S, L> AppTask<'a, C, S, L>
where
    C: ConnectivityPort,
    S: OutputPin,
    L: OutputPin,
{
    pub fn new(
        config: AppConfig,
        mailbox: &'a Mailbox,
        connectivity: &'a C,
        status_pin: S,
        lock_pin: L,
    ) -> Self {
        let function = FunctionButton::new(
            config.factory_reset_trigger_timeout_ms,
            config.factory_reset_cancel_window_ms,
        );
        Self {
            config,
            mailbox,
            connectivity,
            function,
            lock: LockCoordinator::new(),
            snapshot: ConnectivitySnapshot::default(),
            status_led: LedWidget::new(status_pin),
            lock_led: LedWidget::new(lock_pin),
        }
    }

    /// Bring the task to its initial state.
    ///
    /// The lock LED shows the actual bolt position, the update manager
    /// gets its query window, and the firmware revision is read and
    /// logged.  An error here is a startup precondition failure.
    pub fn init(&mut self, hw: &mut impl Platform) -> Result<FirmwareRevision> {
        self.lock_led.set(!hw.is_unlocked());

        hw.set_query_interval_window(
            self.config.swu_interval_window_min_ms,
            self.config.swu_interval_window_max_ms,
        );

        let revision = hw.firmware_revision()?;
        info!("Current Firmware Version: {}", revision);
        Ok(revision)
    }

    // ── Posting ───────────────────────────────────────────────

    pub fn post_event(&self, event: Event) -> bool {
        self.mailbox.post(event)
    }

    /// Queue a lock / unlock on behalf of `actor` (e.g. a remote user).
    pub fn post_lock_action_request(&self, actor: ActorMethod, action: LockAction) -> bool {
        self.post_event(Event::lock(actor, action))
    }

    // ── Loop ──────────────────────────────────────────────────

    /// One full iteration: bounded wait for an event, then [`step`].
    ///
    /// [`step`]: Self::step
    pub fn run_once(&mut self, hw: &mut impl Platform) {
        let timeout = Duration::from_millis(u64::from(self.config.loop_poll_interval_ms));
        if let Some(event) = self.mailbox.receive_timeout(timeout) {
            self.dispatch_event(event, hw);
        }
        self.step(hw);
    }

    /// Everything an iteration does after the wait.  Never blocks.
    pub fn step(&mut self, hw: &mut impl Platform) {
        while let Some(event) = self.mailbox.try_receive() {
            self.dispatch_event(event, hw);
        }

        if let Some(snapshot) = self.connectivity.try_snapshot() {
            self.snapshot = snapshot;
        }

        if self.function.state() != FunctionState::FactoryReset {
            self.status_led.apply(status_pattern(&self.snapshot));
        }

        self.lock.poll_completion(hw, &mut self.lock_led);

        let now = hw.now_ms();
        self.status_led.animate(now);
        self.lock_led.animate(now);
    }

    pub fn dispatch_event(&mut self, event: Event, hw: &mut impl Platform) {
        let Some(handler) = event.handler else {
            warn!("Event received with no Handler. Dropping event.");
            return;
        };

        match handler {
            Handler::LockAction => self.lock_action_event_handler(event, hw),
            Handler::Function => self.function_handler(event, hw),
            Handler::FunctionTimer => self.function_timer_event_handler(event, hw),
            Handler::InstallComplete => {
                info!("Deferred image install acknowledged");
                hw.image_install_complete(Ok(()));
            }
        }
    }

    // ── Handlers ──────────────────────────────────────────────

    fn lock_action_event_handler(&mut self, event: Event, hw: &mut impl Platform) {
        let (actor, action) = match event.kind {
            EventKind::Lock { actor, action } => (actor, action),
            EventKind::Button { .. } => {
                let action = if hw.is_unlocked() {
                    LockAction::Lock
                } else {
                    LockAction::Unlock
                };
                (ActorMethod::Physical, action)
            }
            other => {
                warn!("lock handler: unhandled event {:?}", other);
                return;
            }
        };

        let origin = if actor.is_remote() { "remote" } else { "local" };
        info!("{:?} requested ({} actor {:?})", action, origin, actor);

        if !self
            .lock
            .initiate_action(actor, action, hw, &mut self.lock_led)
        {
            info!("Action is already in progress or active.");
        }
    }

    fn function_handler(&mut self, event: Event, hw: &mut impl Platform) {
        let EventKind::Button { index, action } = event.kind else {
            return;
        };
        if index != FUNCTION_BUTTON {
            return;
        }

        let cmd = match action {
            ButtonAction::Pressed => self.function.on_press(),
            ButtonAction::Released => self.function.on_release(),
        };
        self.apply_function_command(cmd, hw);
    }

    fn function_timer_event_handler(&mut self, event: Event, hw: &mut impl Platform) {
        if !matches!(event.kind, EventKind::Timer { .. }) {
            return;
        }
        let cmd = self.function.on_timer();
        self.apply_function_command(cmd, hw);
    }

    fn apply_function_command(&mut self, cmd: FunctionCommand, hw: &mut impl Platform) {
        match cmd {
            FunctionCommand::Ignore => {}

            FunctionCommand::StartTimer(timeout_ms) => self.start_timer(hw, timeout_ms),

            FunctionCommand::CheckForUpdate => {
                self.cancel_timer(hw);
                if hw.is_in_progress() {
                    info!("Canceling In Progress Software Update");
                    hw.abort();
                } else {
                    info!("Software Update Triggered");
                    hw.check_now();
                }
            }

            FunctionCommand::ArmFactoryReset(cancel_window_ms) => {
                info!(
                    "Factory Reset Triggered. Release button within {}ms to cancel.",
                    cancel_window_ms
                );
                self.start_timer(hw, cancel_window_ms);

                // Force both off first so the two blinks start in phase.
                let blink_ms = self.config.factory_reset_blink_ms;
                self.status_led.set(false);
                self.lock_led.set(false);
                self.status_led.blink(blink_ms);
                self.lock_led.blink(blink_ms);
            }

            FunctionCommand::CancelFactoryReset => {
                self.cancel_timer(hw);
                self.lock_led.set(!hw.is_unlocked());
                info!("Factory Reset has been Canceled");
            }

            FunctionCommand::CommitFactoryReset => {
                info!("Factory Reset Initiated");
                hw.initiate_factory_reset();
            }
        }
    }

    // ── Function timer ────────────────────────────────────────

    fn start_timer(&mut self, hw: &mut impl Platform, timeout_ms: u32) {
        if hw.is_active() {
            warn!("app timer already started!");
            self.cancel_timer(hw);
        }
        if let Err(e) = hw.start(timeout_ms) {
            warn!("app timer start() failed: {e}");
        }
    }

    fn cancel_timer(&mut self, hw: &mut impl Platform) {
        if let Err(e) = hw.stop() {
            warn!("app timer stop() failed: {e}");
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn function_state(&self) -> FunctionState {
        self.function.state()
    }

    pub fn function_timer_armed(&self) -> bool {
        self.function.timer_armed()
    }

    pub fn lock_in_flight(&self) -> Option<LockAction> {
        self.lock.in_flight()
    }

    /// Connectivity as of the last successful refresh.
    pub fn snapshot(&self) -> ConnectivitySnapshot {
        self.snapshot
    }

    pub fn status_led(&self) -> &LedWidget<S> {
        &self.status_led
    }

    pub fn lock_led(&self) -> &LedWidget<L> {
        &self.lock_led
    }
}
