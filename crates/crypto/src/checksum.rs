//! Integrity digests
//!
//! Detects corruption or tampering of guarded files. Nothing is corrected;
//! a mismatch is reported and the data is refused.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use sha2::{Digest as _, Sha256};
use std::fmt;

/// Length of a digest in bytes
pub const DIGEST_LEN: usize = 32;

/// SHA-256 digest of some content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; DIGEST_LEN]);

/// Compute the digest of `bytes`
#[must_use]
pub fn digest(bytes: &[u8]) -> Digest {
    Digest(Sha256::digest(bytes).into())
}

impl Digest {
    /// Raw digest bytes
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Text form stored in checksum files (standard base64)
    #[must_use]
    pub fn to_text(&self) -> String {
        STANDARD.encode(self.0)
    }

    /// Whether a stored checksum text describes this digest.
    ///
    /// Surrounding whitespace in the stored text is ignored. Text that is not
    /// valid base64 never matches.
    #[must_use]
    pub fn matches_text(&self, stored: &str) -> bool {
        STANDARD
            .decode(stored.trim())
            .is_ok_and(|bytes| bytes.as_slice() == self.as_bytes())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
