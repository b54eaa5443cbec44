//! Fuzz target: `SoftwareUpdateHandler::handle_event`
//!
//! Replays an arbitrary sequence of update-manager callbacks, decoded
//! one opcode byte at a time, and checks that the handler:
//! - never panics, whatever order the callbacks arrive in
//! - reports a resume offset only for the exact stored URI
//! - keeps its byte count equal to what was stored since the last reset
//! - never writes an undersized integrity buffer
//!
//! cargo fuzz run fuzz_update_session

#![no_main]

use boltlock::app::ports::{FirmwareRevision, UpdateCallbacks};
use boltlock::events::Mailbox;
use boltlock::update::{
    ImageDigest, SoftwareUpdateHandler, UpdateError, UpdateEvent, UpdateOutcome, UpdateResponse,
};
use libfuzzer_sys::fuzz_target;

struct Manager;

impl UpdateCallbacks for Manager {
    fn prepare_image_storage_complete(&mut self, _result: Result<(), UpdateError>) {}

    fn default_event_handler(&mut self, _event: &UpdateEvent<'_>) -> Result<UpdateResponse, UpdateError> {
        Ok(UpdateResponse::Forwarded)
    }
}

const URIS: [&str; 3] = ["bdx://a", "bdx://b", ""];

fuzz_target!(|data: &[u8]| {
    let mb = Mailbox::new();
    let Ok(revision) = FirmwareRevision::try_from("1.0.0") else {
        return;
    };
    let mut h = SoftwareUpdateHandler::new(&mb, revision);
    let mut m = Manager;

    // Model of what the handler should remember.
    let mut uri: &str = "";
    let mut stored: u64 = 0;

    let mut rest = data;
    while let Some((&op, tail)) = rest.split_first() {
        rest = tail;
        let arg = rest.first().copied().unwrap_or(0);

        match op % 8 {
            0 => {
                let u = URIS[usize::from(arg) % URIS.len()];
                h.handle_event(UpdateEvent::PrepareImageStorage { uri: u }, &mut m)
                    .unwrap();
                uri = u;
                stored = 0;
            }
            1 => {
                let n = usize::from(arg).min(rest.len());
                let (block, tail) = rest.split_at(n);
                rest = tail;
                h.handle_event(UpdateEvent::StoreImageBlock { data: block }, &mut m)
                    .unwrap();
                stored += block.len() as u64;
            }
            2 => {
                let u = URIS[usize::from(arg) % URIS.len()];
                let r = h.handle_event(UpdateEvent::FetchPartialImageInfo { uri: u }, &mut m);
                let expected = if u == uri { stored as u32 } else { 0 };
                assert_eq!(r, Ok(UpdateResponse::PartialImageLen(expected)));
            }
            3 => {
                let len = usize::from(arg) % (2 * ImageDigest::LEN);
                let mut buf = vec![0xA5u8; len];
                let r = h.handle_event(UpdateEvent::ComputeImageIntegrity { buf: &mut buf }, &mut m);
                if len < ImageDigest::LEN {
                    assert_eq!(r, Err(UpdateError::BufferTooSmall));
                    assert!(buf.iter().all(|b| *b == 0xA5));
                } else {
                    assert_eq!(r, Ok(UpdateResponse::IntegrityComputed(ImageDigest::LEN)));
                }
            }
            4 => {
                h.handle_event(UpdateEvent::ResetPartialImageInfo, &mut m).unwrap();
                uri = "";
                stored = 0;
            }
            5 => {
                let result = match arg % 4 {
                    0 => Ok(()),
                    1 => Err(UpdateError::NoUpdateAvailable),
                    2 => Err(UpdateError::Aborted),
                    _ => Err(UpdateError::Transport(i32::from(arg))),
                };
                let r = h.handle_event(
                    UpdateEvent::Finished {
                        result,
                        status_report: None,
                    },
                    &mut m,
                );
                if r == Ok(UpdateResponse::Finished(UpdateOutcome::Completed)) {
                    uri = "";
                    stored = 0;
                }
            }
            6 => {
                // Drain so the bounded mailbox never fills up.
                h.handle_event(UpdateEvent::StartInstallImage, &mut m).unwrap();
                while mb.try_receive().is_some() {}
            }
            _ => {
                let _ = h.handle_event(UpdateEvent::PrepareQueryMetadata { writer: None }, &mut m);
            }
        }

        assert_eq!(u64::from(h.image_len()), stored.min(u64::from(u32::MAX)));
        assert_eq!(h.image_uri(), uri);
    }
});
