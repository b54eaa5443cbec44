//! Streaming SHA-256 over the downloaded image.
//!
//! Blocks are hashed as they arrive; nothing is kept on flash.  The
//! running state lives only in RAM, so a restart mid-download loses it
//! even when the partial length is still offered for resumption.

use hmac_sha256::Hash;

pub struct ImageDigest {
    hash: Hash,
}

impl ImageDigest {
    /// Output length in bytes.
    pub const LEN: usize = 32;

    pub fn new() -> Self {
        Self { hash: Hash::new() }
    }

    /// Discard everything hashed so far.
    pub fn reset(&mut self) {
        self.hash = Hash::new();
    }

    pub fn update(&mut self, block: &[u8]) {
        self.hash.update(block);
    }

    /// Produce the digest and start over with a fresh state.
    pub fn finish(&mut self) -> [u8; Self::LEN] {
        core::mem::replace(&mut self.hash, Hash::new()).finalize()
    }
}

impl Default for ImageDigest {
    fn default() -> Self {
        Self::new()
    }
}
