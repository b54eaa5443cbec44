//! Per-device update session state and the callback handler.
//!
//! The handler keeps what a resumable download needs between callbacks:
//! the image URI, the number of bytes received and the running digest.
//! Length and digest are always reset together.  The state is held in
//! RAM only; see [`ImageDigest`] for what that means across a restart.
//!
//! The update manager serialises its callbacks, so the handler needs no
//! locking of its own.  The one hand-off to the control task
//! (StartInstallImage) goes through the mailbox.

use heapless::String;
use log::{error, info, warn};

use super::{
    ImageDigest, MetadataTag, QueryParams, UpdateError, UpdateEvent, UpdateOutcome, UpdateResponse,
    classify,
};
use crate::app::ports::{FirmwareRevision, UpdateCallbacks};
use crate::events::{Event, Mailbox};

/// Longest image URI remembered for resumption.  Longer URIs are
/// truncated, so they never match on the next fetch.
pub const MAX_IMAGE_URI_LEN: usize = 256;

const CERT_BODY_ID: u32 = 0;
const SUFFICIENT_BATTERY: bool = true;

pub struct SoftwareUpdateHandler<'a> {
    mailbox: &'a Mailbox,
    firmware_revision: FirmwareRevision,
    image_uri: String<MAX_IMAGE_URI_LEN>,
    image_len: u32,
    digest: ImageDigest,
}

impl<'a> SoftwareUpdateHandler<'a> {
    pub fn new(mailbox: &'a Mailbox, firmware_revision: FirmwareRevision) -> Self {
        Self {
            mailbox,
            firmware_revision,
            image_uri: String::new(),
            image_len: 0,
            digest: ImageDigest::new(),
        }
    }

    /// Bytes of the current image received so far.
    pub fn image_len(&self) -> u32 {
        self.image_len
    }

    /// URI of the image being downloaded (empty when none).
    pub fn image_uri(&self) -> &str {
        &self.image_uri
    }

    pub fn firmware_revision(&self) -> &str {
        &self.firmware_revision
    }

    /// Handle one callback from the update manager.
    ///
    /// `Err` is the status handed back to the manager for this callback;
    /// it never affects anything outside the session.
    pub fn handle_event<C: UpdateCallbacks>(
        &mut self,
        event: UpdateEvent<'_>,
        manager: &mut C,
    ) -> Result<UpdateResponse, UpdateError> {
        match event {
            UpdateEvent::PrepareQuery => Ok(UpdateResponse::PrepareQuery(QueryParams::default())),

            UpdateEvent::PrepareQueryMetadata { writer } => {
                let Some(writer) = writer else {
                    error!("swu: metadata writer is missing");
                    return Err(UpdateError::InvalidArgument);
                };
                writer.put_u32(MetadataTag::CertBodyId, CERT_BODY_ID)?;
                writer.put_bool(MetadataTag::SufficientBatterySwu, SUFFICIENT_BATTERY)?;
                Ok(UpdateResponse::Handled)
            }

            UpdateEvent::QueryPrepareFailed {
                error,
                status_report,
            } => {
                match (error, status_report) {
                    (UpdateError::StatusReportReceived, Some(report)) => {
                        warn!("Software Update failed during prepare: Received StatusReport {report}");
                    }
                    _ => warn!("Software Update failed during prepare: {error}"),
                }
                Ok(UpdateResponse::Handled)
            }

            UpdateEvent::SoftwareUpdateAvailable(offer) => {
                info!("Current Firmware Version: {}", self.firmware_revision);
                info!(
                    "Software Update Available - Priority: {} Condition: {} Version: {} IntegrityType: {} URI: {}",
                    offer.priority, offer.condition, offer.version, offer.integrity_type, offer.uri
                );
                Ok(UpdateResponse::Handled)
            }

            UpdateEvent::FetchPartialImageInfo { uri } => {
                info!("Fetching Partial Image Information");
                if uri == self.image_uri.as_str() {
                    info!(
                        "Partial image detected in local storage; resuming download at offset {}",
                        self.image_len
                    );
                    Ok(UpdateResponse::PartialImageLen(self.image_len))
                } else {
                    info!("No partial image detected in local storage");
                    Ok(UpdateResponse::PartialImageLen(0))
                }
            }

            UpdateEvent::PrepareImageStorage { uri } => {
                info!("Preparing Image Storage");
                self.reset_progress();
                self.store_uri(uri);
                manager.prepare_image_storage_complete(Ok(()));
                Ok(UpdateResponse::Handled)
            }

            UpdateEvent::StartImageDownload => {
                info!("Starting Image Download");
                Ok(UpdateResponse::Handled)
            }

            UpdateEvent::StoreImageBlock { data } => {
                self.digest.update(data);
                self.image_len = advance_image_len(self.image_len, data.len());
                info!("Image Download: {} bytes received", self.image_len);
                Ok(UpdateResponse::Handled)
            }

            UpdateEvent::ComputeImageIntegrity { buf } => {
                info!("Computing image integrity");
                info!("Total image length: {}", self.image_len);
                if buf.len() < ImageDigest::LEN {
                    return Err(UpdateError::BufferTooSmall);
                }
                buf[..ImageDigest::LEN].copy_from_slice(&self.digest.finish());
                Ok(UpdateResponse::IntegrityComputed(ImageDigest::LEN))
            }

            UpdateEvent::ResetPartialImageInfo => {
                self.clear_partial_image();
                Ok(UpdateResponse::Handled)
            }

            UpdateEvent::ReadyToInstall => {
                info!("Image is ready to be installed");
                Ok(UpdateResponse::Handled)
            }

            UpdateEvent::StartInstallImage => {
                info!("Image Install is not supported in this application");
                self.mailbox.post(Event::install());
                Ok(UpdateResponse::Handled)
            }

            UpdateEvent::Finished {
                result,
                status_report,
            } => {
                let outcome = classify(result, status_report);
                match outcome {
                    UpdateOutcome::NoUpdateAvailable => info!("No Software Update Available"),
                    UpdateOutcome::Ignored => info!("Software Update Ignored by Application"),
                    UpdateOutcome::Aborted => info!("Software Update Aborted by Application"),
                    UpdateOutcome::StatusReport(report) => {
                        warn!("Software Update failed: Received StatusReport {report}")
                    }
                    UpdateOutcome::Failed(e) => warn!("Software Update failed: {e}"),
                    UpdateOutcome::Completed => {
                        info!("Software Update Completed");
                        // The image is never applied, so the next attempt
                        // must download it again.
                        self.clear_partial_image();
                    }
                }
                Ok(UpdateResponse::Finished(outcome))
            }

            other @ UpdateEvent::Other { .. } => manager.default_event_handler(&other),
        }
    }

    fn reset_progress(&mut self) {
        self.image_len = 0;
        self.digest.reset();
    }

    fn clear_partial_image(&mut self) {
        self.reset_progress();
        self.image_uri.clear();
    }

    fn store_uri(&mut self, uri: &str) {
        let mut end = uri.len().min(MAX_IMAGE_URI_LEN);
        while !uri.is_char_boundary(end) {
            end -= 1;
        }
        self.image_uri.clear();
        // Cannot fail: `end` is within capacity.
        let _ = self.image_uri.push_str(&uri[..end]);
    }
}

/// Byte count after one more block.  Saturates rather than wraps, so an
/// oversized image never resumes at a bogus offset.
fn advance_image_len(len: u32, block_len: usize) -> u32 {
    len.saturating_add(u32::try_from(block_len).unwrap_or(u32::MAX))
}
