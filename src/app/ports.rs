//! Port traits: the hexagonal boundary between the control core and
//! the collaborators it drives.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AppTask / SoftwareUpdateHandler (domain)
//! ```
//!
//! Adapters (timer, bolt actuator, trait data source, update manager,
//! configuration manager, clock) implement these traits.  The control
//! core consumes them via generics, so it never touches the networking
//! stack or hardware directly.

use heapless::String;

use crate::app::lock::{ActorMethod, LockAction};
use crate::connectivity::ConnectivitySnapshot;
use crate::error::{Error, TimerError};
use crate::update::{UpdateError, UpdateEvent, UpdateResponse};

/// Longest firmware revision string the configuration manager reports.
pub const MAX_FIRMWARE_REVISION_LEN: usize = 32;

pub type FirmwareRevision = String<MAX_FIRMWARE_REVISION_LEN>;

// ───────────────────────────────────────────────────────────────
// Function timer (single re-armable one-shot)
// ───────────────────────────────────────────────────────────────

/// The one-shot timer shared by the trigger and cancel-window phases.
///
/// Expiry is delivered out of band: the implementation posts a timer
/// event into the mailbox from its own callback context.
pub trait FunctionTimer {
    /// (Re)start the timer with a new period.
    fn start(&mut self, timeout_ms: u32) -> Result<(), TimerError>;

    /// Stop the timer.  Stopping an idle timer is not an error.
    fn stop(&mut self) -> Result<(), TimerError>;

    fn is_active(&self) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Lock actuator (bolt motor)
// ───────────────────────────────────────────────────────────────

pub trait LockActuator {
    fn is_unlocked(&self) -> bool;

    /// Start moving the bolt.  Completion is reported by `poll_completed`.
    fn begin(&mut self, action: LockAction, now_ms: u64);

    /// Returns the action that finished since the last poll, if any.
    fn poll_completed(&mut self, now_ms: u64) -> Option<LockAction>;
}

// ───────────────────────────────────────────────────────────────
// Lock trait data source (network-facing data model)
// ───────────────────────────────────────────────────────────────

/// Receives lock state transitions for publication to the service.
pub trait LockTraitSink {
    fn initiate_lock(&mut self, actor: ActorMethod);
    fn initiate_unlock(&mut self, actor: ActorMethod);
    fn locking_successful(&mut self);
    fn unlocking_successful(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Software update manager
// ───────────────────────────────────────────────────────────────

/// Control-task side of the external update manager.
pub trait UpdateControl {
    fn is_in_progress(&self) -> bool;

    /// Abort the session in progress.
    fn abort(&mut self);

    /// Start a query right away instead of waiting for the next interval.
    fn check_now(&mut self);

    /// Acknowledge the StartInstallImage callback.
    fn image_install_complete(&mut self, result: Result<(), UpdateError>);

    /// Configure the randomised periodic query window.
    fn set_query_interval_window(&mut self, min_ms: u32, max_ms: u32);
}

/// Callback-context side of the external update manager.
pub trait UpdateCallbacks {
    /// Acknowledge the PrepareImageStorage callback.
    fn prepare_image_storage_complete(&mut self, result: Result<(), UpdateError>);

    /// Handle an event the application does not process itself.
    fn default_event_handler(&mut self, event: &UpdateEvent<'_>)
    -> Result<UpdateResponse, UpdateError>;
}

// ───────────────────────────────────────────────────────────────
// Configuration manager
// ───────────────────────────────────────────────────────────────

pub trait DevicePort {
    fn firmware_revision(&self) -> Result<FirmwareRevision, Error>;

    /// Erase device configuration and restart.  Irreversible.
    fn initiate_factory_reset(&mut self);
}

// ───────────────────────────────────────────────────────────────
// Connectivity (networking stack state)
// ───────────────────────────────────────────────────────────────

/// Non-blocking view of the networking stack's connectivity flags.
pub trait ConnectivityPort {
    /// Take a snapshot if the stack lock is free right now.
    ///
    /// Returns `None` on contention; callers keep their last snapshot.
    fn try_snapshot(&self) -> Option<ConnectivitySnapshot>;
}

// ───────────────────────────────────────────────────────────────
// Clock
// ───────────────────────────────────────────────────────────────

pub trait Clock {
    /// Milliseconds since boot (monotonic).
    fn now_ms(&self) -> u64;
}

// ───────────────────────────────────────────────────────────────
// Platform bundle
// ───────────────────────────────────────────────────────────────

/// Everything the control task drives, satisfied by one adapter.
pub trait Platform:
    FunctionTimer + LockActuator + LockTraitSink + UpdateControl + DevicePort + Clock
{
}

impl<T> Platform for T where
    T: FunctionTimer + LockActuator + LockTraitSink + UpdateControl + DevicePort + Clock
{
}
