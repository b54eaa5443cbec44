//! Connectivity flags shared between the networking stack and the
//! control task.
//!
//! The networking stack task owns the flags and updates them under its
//! own lock, sometimes while doing slow work (e.g. crypto).  The control
//! task only ever *tries* the lock: on contention it keeps the previous
//! [`ConnectivitySnapshot`] so LED cadence never stalls on the stack.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::{Mutex, MutexGuard};

use crate::app::ports::ConnectivityPort;

/// Point-in-time copy of the connectivity flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectivitySnapshot {
    pub thread_provisioned: bool,
    pub thread_enabled: bool,
    pub thread_attached: bool,
    pub paired_to_account: bool,
    pub service_subscription_established: bool,
    pub ble_connected: bool,
    pub service_connectivity: bool,
}

impl ConnectivitySnapshot {
    /// Service reachable *and* subscriptions up.
    pub fn is_fully_connected(&self) -> bool {
        self.service_connectivity && self.service_subscription_established
    }
}

/// Stack-owned connectivity flags behind the stack lock.
pub struct ConnectivityState {
    flags: Mutex<CriticalSectionRawMutex, ConnectivitySnapshot>,
}

impl ConnectivityState {
    pub const fn new() -> Self {
        Self {
            flags: Mutex::new(ConnectivitySnapshot {
                thread_provisioned: false,
                thread_enabled: false,
                thread_attached: false,
                paired_to_account: false,
                service_subscription_established: false,
                ble_connected: false,
                service_connectivity: false,
            }),
        }
    }

    /// Stack side: take the lock (waiting if needed) and mutate the flags.
    pub fn update(&self, f: impl FnOnce(&mut ConnectivitySnapshot)) {
        let mut guard = futures_lite::future::block_on(self.flags.lock());
        f(&mut guard);
    }

    /// Stack side: hold the lock for a longer operation.
    ///
    /// Returns `None` if someone else holds it.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, CriticalSectionRawMutex, ConnectivitySnapshot>> {
        self.flags.try_lock().ok()
    }
}

impl Default for ConnectivityState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityPort for ConnectivityState {
    fn try_snapshot(&self) -> Option<ConnectivitySnapshot> {
        self.flags.try_lock().ok().map(|guard| *guard)
    }
}
