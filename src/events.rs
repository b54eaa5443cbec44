//! Application events and the bounded mailbox feeding the control task.
//!
//! Events are produced by:
//! - the button debounce source (press / release of the two app buttons)
//! - the function timer callback (one-shot expiry)
//! - software (remote lock requests, deferred update acknowledgements)
//!
//! and consumed by a single control task that drains them in FIFO order.
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ Buttons     │────▶│              │     │              │
//! │ Fn timer    │────▶│   Mailbox    │────▶│   AppTask    │
//! │ Lock reqs   │────▶│  (10 slots)  │     │  (consumer)  │
//! │ SWU install │────▶│              │     │              │
//! └─────────────┘     └──────────────┘     └──────────────┘
//! ```
//!
//! Every event carries the [`Handler`] chosen when it was posted.  An
//! event without one is dropped at dispatch with a warning.

use core::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::lock::{ActorMethod, LockAction};
use crate::config::MAILBOX_CAPACITY;

/// Logical index of the lock / unlock button.
pub const LOCK_BUTTON: u8 = 0;
/// Logical index of the multiplexed function button.
pub const FUNCTION_BUTTON: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    Pressed,
    Released,
}

/// Opaque identity of the timer that fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle(pub u32);

/// Payload of an event, one variant per producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Button { index: u8, action: ButtonAction },
    Timer { handle: TimerHandle },
    Lock { actor: ActorMethod, action: LockAction },
    Install,
}

/// Which control-task routine handles an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler {
    /// Lock-button press or remote lock request.
    LockAction,
    /// Function-button press / release.
    Function,
    /// Function timer expiry.
    FunctionTimer,
    /// Deferred software-update install acknowledgement.
    InstallComplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub handler: Option<Handler>,
}

impl Event {
    /// Translate a raw button edge into an event.
    ///
    /// Only the lock and function buttons produce events; the lock button
    /// only on press.  Everything else is filtered out here so it never
    /// reaches the mailbox.
    pub fn button(index: u8, action: ButtonAction) -> Option<Self> {
        let handler = match (index, action) {
            (LOCK_BUTTON, ButtonAction::Pressed) => Handler::LockAction,
            (FUNCTION_BUTTON, _) => Handler::Function,
            _ => return None,
        };
        Some(Self {
            kind: EventKind::Button { index, action },
            handler: Some(handler),
        })
    }

    pub fn timer(handle: TimerHandle) -> Self {
        Self {
            kind: EventKind::Timer { handle },
            handler: Some(Handler::FunctionTimer),
        }
    }

    pub fn lock(actor: ActorMethod, action: LockAction) -> Self {
        Self {
            kind: EventKind::Lock { actor, action },
            handler: Some(Handler::LockAction),
        }
    }

    pub fn install() -> Self {
        Self {
            kind: EventKind::Install,
            handler: Some(Handler::InstallComplete),
        }
    }
}

// ── Mailbox ───────────────────────────────────────────────────
//
// Producers post from timer / debounce / update-manager contexts;
// the control task is the only consumer.  Posting never blocks.

/// Fixed-capacity FIFO of [`Event`]s with a single consumer.
pub struct Mailbox {
    channel: Channel<CriticalSectionRawMutex, Event, MAILBOX_CAPACITY>,
}

impl Mailbox {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue an event without waiting.
    ///
    /// Returns `false` (and logs) if the mailbox is full; the event is
    /// dropped and the producer gets no other signal.
    pub fn post(&self, event: Event) -> bool {
        if self.channel.try_send(event).is_err() {
            warn!("Failed to post event to app task event queue: {:?}", event.kind);
            return false;
        }
        true
    }

    /// Dequeue the next event, if any, without waiting.
    pub fn try_receive(&self) -> Option<Event> {
        self.channel.try_receive().ok()
    }

    /// Wait up to `timeout` for the next event.
    pub fn receive_timeout(&self, timeout: Duration) -> Option<Event> {
        let micros = u64::try_from(timeout.as_micros()).unwrap_or(u64::MAX);
        futures_lite::future::block_on(embassy_time::with_timeout(
            embassy_time::Duration::from_micros(micros),
            self.channel.receive(),
        ))
        .ok()
    }

    /// Number of pending events.
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}

impl Default for Mailbox {
    fn default() -> Self {
        Self::new()
    }
}
