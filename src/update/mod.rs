//! Software-update session: the application side of the update
//! manager's callback contract.
//!
//! The manager drives one session at a time through a fixed sequence of
//! callbacks:
//!
//! ```text
//! PrepareQuery → PrepareQueryMetadata → { QueryPrepareFailed | SoftwareUpdateAvailable }
//!   → FetchPartialImageInfo → PrepareImageStorage → StartImageDownload
//!   → StoreImageBlock* → ComputeImageIntegrity → ReadyToInstall → StartInstallImage
//!   → Finished
//! ```
//!
//! Each callback is an [`UpdateEvent`] variant carrying only its own
//! payload; the handler answers with an [`UpdateResponse`] or an
//! [`UpdateError`] status.

pub mod digest;
pub mod session;

use core::fmt;

pub use digest::ImageDigest;
pub use session::{MAX_IMAGE_URI_LEN, SoftwareUpdateHandler};

// ---------------------------------------------------------------------------
// Status codes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateError {
    /// A required callback argument was missing.
    InvalidArgument,
    /// The integrity buffer cannot hold the digest.
    BufferTooSmall,
    /// The service has nothing newer to offer.
    NoUpdateAvailable,
    /// The application declined the offered image.
    Ignored,
    /// The application aborted the running session.
    Aborted,
    /// The service replied with a status report.
    StatusReportReceived,
    /// Any other manager / transport failure (raw code).
    Transport(i32),
}

impl fmt::Display for UpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::BufferTooSmall => write!(f, "buffer too small"),
            Self::NoUpdateAvailable => write!(f, "no software update available"),
            Self::Ignored => write!(f, "software update ignored"),
            Self::Aborted => write!(f, "software update aborted"),
            Self::StatusReportReceived => write!(f, "status report received"),
            Self::Transport(code) => write!(f, "transport error {code}"),
        }
    }
}

/// Status report returned by the update service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub profile_id: u32,
    pub status_code: u16,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "profile 0x{:08X} status 0x{:04X}", self.profile_id, self.status_code)
    }
}

// ---------------------------------------------------------------------------
// Query metadata
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataTag {
    CertBodyId,
    SufficientBatterySwu,
}

/// Sink for the metadata attached to an update query.
pub trait MetadataWriter {
    fn put_u32(&mut self, tag: MetadataTag, value: u32) -> Result<(), UpdateError>;
    fn put_bool(&mut self, tag: MetadataTag, value: bool) -> Result<(), UpdateError>;
}

// ---------------------------------------------------------------------------
// Callback events
// ---------------------------------------------------------------------------

/// Description of an image offered by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateAvailable<'a> {
    pub priority: u8,
    pub condition: u8,
    pub version: &'a str,
    pub integrity_type: u8,
    pub uri: &'a str,
}

pub enum UpdateEvent<'a> {
    PrepareQuery,
    PrepareQueryMetadata {
        writer: Option<&'a mut dyn MetadataWriter>,
    },
    QueryPrepareFailed {
        error: UpdateError,
        status_report: Option<StatusReport>,
    },
    SoftwareUpdateAvailable(UpdateAvailable<'a>),
    FetchPartialImageInfo {
        uri: &'a str,
    },
    PrepareImageStorage {
        uri: &'a str,
    },
    StartImageDownload,
    StoreImageBlock {
        data: &'a [u8],
    },
    ComputeImageIntegrity {
        buf: &'a mut [u8],
    },
    ResetPartialImageInfo,
    ReadyToInstall,
    StartInstallImage,
    Finished {
        result: Result<(), UpdateError>,
        status_report: Option<StatusReport>,
    },
    /// Any callback the application does not handle itself.
    Other {
        code: u8,
    },
}

impl UpdateEvent<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::PrepareQuery => "PrepareQuery",
            Self::PrepareQueryMetadata { .. } => "PrepareQuery_Metadata",
            Self::QueryPrepareFailed { .. } => "QueryPrepareFailed",
            Self::SoftwareUpdateAvailable(_) => "SoftwareUpdateAvailable",
            Self::FetchPartialImageInfo { .. } => "FetchPartialImageInfo",
            Self::PrepareImageStorage { .. } => "PrepareImageStorage",
            Self::StartImageDownload => "StartImageDownload",
            Self::StoreImageBlock { .. } => "StoreImageBlock",
            Self::ComputeImageIntegrity { .. } => "ComputeImageIntegrity",
            Self::ResetPartialImageInfo => "ResetPartialImageInfo",
            Self::ReadyToInstall => "ReadyToInstall",
            Self::StartInstallImage => "StartInstallImage",
            Self::Finished { .. } => "Finished",
            Self::Other { .. } => "Other",
        }
    }
}

impl fmt::Debug for UpdateEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Parameters of the outgoing query.  `None` lets the manager use its
/// defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryParams {
    pub package_specification: Option<&'static str>,
    pub desired_locale: Option<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateResponse {
    /// Event consumed; nothing to return.
    Handled,
    PrepareQuery(QueryParams),
    /// Bytes already present for the requested image (0 = start over).
    PartialImageLen(u32),
    /// Number of digest bytes written into the caller's buffer.
    IntegrityComputed(usize),
    Finished(UpdateOutcome),
    /// Passed to the manager's default handler.
    Forwarded,
}

// ---------------------------------------------------------------------------
// Terminal classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    NoUpdateAvailable,
    Ignored,
    Aborted,
    StatusReport(StatusReport),
    Failed(UpdateError),
    Completed,
}

/// Classify how a session ended.
///
/// The specific "benign" endings are recognised first; any remaining
/// error or a status report is a failure, and only a clean `Ok` with no
/// report counts as success.
pub fn classify(result: Result<(), UpdateError>, status_report: Option<StatusReport>) -> UpdateOutcome {
    match (result, status_report) {
        (Err(UpdateError::NoUpdateAvailable), _) => UpdateOutcome::NoUpdateAvailable,
        (Err(UpdateError::Ignored), _) => UpdateOutcome::Ignored,
        (Err(UpdateError::Aborted), _) => UpdateOutcome::Aborted,
        (Err(UpdateError::StatusReportReceived), Some(report)) => UpdateOutcome::StatusReport(report),
        (Err(e), _) => UpdateOutcome::Failed(e),
        (Ok(()), Some(report)) => UpdateOutcome::StatusReport(report),
        (Ok(()), None) => UpdateOutcome::Completed,
    }
}
