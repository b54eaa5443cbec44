//! Log-based lock trait sink.
//!
//! Implements [`LockTraitSink`] by tracking the published bolt state and
//! writing every transition to the ESP-IDF logger.  A data-model adapter
//! for the networking stack would implement the same trait.

use log::info;

use crate::app::lock::ActorMethod;
use crate::app::ports::LockTraitSink;

/// Bolt state as published to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoltState {
    Locked,
    Unlocking,
    Unlocked,
    Locking,
}

pub struct LogTraitSink {
    state: BoltState,
    last_actor: Option<ActorMethod>,
}

impl Default for LogTraitSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogTraitSink {
    pub fn new() -> Self {
        Self {
            state: BoltState::Locked,
            last_actor: None,
        }
    }

    pub fn state(&self) -> BoltState {
        self.state
    }

    /// Actor of the most recent initiated action.
    pub fn last_actor(&self) -> Option<ActorMethod> {
        self.last_actor
    }

    fn publish(&mut self, state: BoltState) {
        info!("TRAIT | bolt {:?} -> {:?}", self.state, state);
        self.state = state;
    }
}

impl LockTraitSink for LogTraitSink {
    fn initiate_lock(&mut self, actor: ActorMethod) {
        self.last_actor = Some(actor);
        self.publish(BoltState::Locking);
    }

    fn initiate_unlock(&mut self, actor: ActorMethod) {
        self.last_actor = Some(actor);
        self.publish(BoltState::Unlocking);
    }

    fn locking_successful(&mut self) {
        self.publish(BoltState::Locked);
    }

    fn unlocking_successful(&mut self) {
        self.publish(BoltState::Unlocked);
    }
}
