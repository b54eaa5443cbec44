//! Simulated software-update manager.
//!
//! The reference device has no update service attached.  This adapter
//! plays the manager's role: `check_now()` queues a query, and
//! [`SimUpdateManager::service`] (called from the manager's own
//! context) runs it through the application's [`SoftwareUpdateHandler`]:
//!
//! ```text
//! PrepareQuery → PrepareQuery_Metadata → Finished(no update available)
//! ```
//!
//! Callbacks are strictly serialised, so the handler sees the same
//! contract it would from a real manager.

use log::{debug, info, warn};

use crate::app::ports::{UpdateCallbacks, UpdateControl};
use crate::update::{
    MetadataTag, MetadataWriter, SoftwareUpdateHandler, StatusReport, UpdateError, UpdateEvent,
    UpdateOutcome, UpdateResponse,
};

/// Metadata collected for the outgoing query.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueryMetadata {
    pub cert_body_id: Option<u32>,
    pub sufficient_battery: Option<bool>,
}

impl MetadataWriter for QueryMetadata {
    fn put_u32(&mut self, tag: MetadataTag, value: u32) -> Result<(), UpdateError> {
        match tag {
            MetadataTag::CertBodyId => self.cert_body_id = Some(value),
            MetadataTag::SufficientBatterySwu => return Err(UpdateError::InvalidArgument),
        }
        Ok(())
    }

    fn put_bool(&mut self, tag: MetadataTag, value: bool) -> Result<(), UpdateError> {
        match tag {
            MetadataTag::SufficientBatterySwu => self.sufficient_battery = Some(value),
            MetadataTag::CertBodyId => return Err(UpdateError::InvalidArgument),
        }
        Ok(())
    }
}

/// Manager side of the callback contract.
#[derive(Debug, Default)]
pub struct ManagerCallbacks {
    storage_ready: Option<Result<(), UpdateError>>,
}

impl UpdateCallbacks for ManagerCallbacks {
    fn prepare_image_storage_complete(&mut self, result: Result<(), UpdateError>) {
        debug!("swu(sim): image storage ready: {:?}", result);
        self.storage_ready = Some(result);
    }

    fn default_event_handler(&mut self, event: &UpdateEvent<'_>) -> Result<UpdateResponse, UpdateError> {
        debug!("swu(sim): default handling for {:?}", event);
        Ok(UpdateResponse::Forwarded)
    }
}

pub struct SimUpdateManager<'a> {
    handler: SoftwareUpdateHandler<'a>,
    callbacks: ManagerCallbacks,
    check_pending: bool,
    in_progress: bool,
    install_pending: bool,
    query_window_ms: (u32, u32),
    last_metadata: QueryMetadata,
    last_outcome: Option<UpdateOutcome>,
}

impl<'a> SimUpdateManager<'a> {
    pub fn new(handler: SoftwareUpdateHandler<'a>) -> Self {
        Self {
            handler,
            callbacks: ManagerCallbacks::default(),
            check_pending: false,
            in_progress: false,
            install_pending: false,
            query_window_ms: (0, 0),
            last_metadata: QueryMetadata::default(),
            last_outcome: None,
        }
    }

    /// Run a queued query, if any.
    pub fn service(&mut self) {
        if !self.check_pending {
            return;
        }
        self.check_pending = false;
        self.in_progress = true;

        let result = self.run_query();
        self.finish(result, None);
    }

    /// Deliver one callback to the application handler.
    pub fn deliver(&mut self, event: UpdateEvent<'_>) -> Result<UpdateResponse, UpdateError> {
        if matches!(event, UpdateEvent::StartInstallImage) {
            self.install_pending = true;
        }
        self.handler.handle_event(event, &mut self.callbacks)
    }

    pub fn handler(&self) -> &SoftwareUpdateHandler<'a> {
        &self.handler
    }

    pub fn query_window_ms(&self) -> (u32, u32) {
        self.query_window_ms
    }

    pub fn last_metadata(&self) -> QueryMetadata {
        self.last_metadata
    }

    pub fn last_outcome(&self) -> Option<UpdateOutcome> {
        self.last_outcome
    }

    pub fn install_pending(&self) -> bool {
        self.install_pending
    }

    fn run_query(&mut self) -> Result<(), UpdateError> {
        self.deliver(UpdateEvent::PrepareQuery)?;

        let mut metadata = QueryMetadata::default();
        let prepared = self.deliver(UpdateEvent::PrepareQueryMetadata {
            writer: Some(&mut metadata),
        });
        self.last_metadata = metadata;
        if let Err(error) = prepared {
            self.deliver(UpdateEvent::QueryPrepareFailed {
                error,
                status_report: None,
            })?;
            return Err(error);
        }

        // No service to ask: nothing is ever newer.
        Err(UpdateError::NoUpdateAvailable)
    }

    fn finish(&mut self, result: Result<(), UpdateError>, status_report: Option<StatusReport>) {
        self.in_progress = false;
        match self.deliver(UpdateEvent::Finished {
            result,
            status_report,
        }) {
            Ok(UpdateResponse::Finished(outcome)) => self.last_outcome = Some(outcome),
            Ok(other) => warn!("swu(sim): unexpected Finished response {:?}", other),
            Err(e) => warn!("swu(sim): Finished rejected: {e}"),
        }
    }
}

impl UpdateControl for SimUpdateManager<'_> {
    fn is_in_progress(&self) -> bool {
        self.in_progress || self.check_pending
    }

    fn abort(&mut self) {
        if !self.is_in_progress() {
            return;
        }
        info!("swu(sim): aborting session");
        self.check_pending = false;
        self.finish(Err(UpdateError::Aborted), None);
    }

    fn check_now(&mut self) {
        info!("swu(sim): query requested");
        self.check_pending = true;
    }

    fn image_install_complete(&mut self, result: Result<(), UpdateError>) {
        if !self.install_pending {
            warn!("swu(sim): install completion without a pending install");
        }
        self.install_pending = false;
        info!("swu(sim): image install complete: {:?}", result);
    }

    fn set_query_interval_window(&mut self, min_ms: u32, max_ms: u32) {
        info!("swu(sim): query interval window {}..{} ms", min_ms, max_ms);
        self.query_window_ms = (min_ms, max_ms);
    }
}
