use sha2::{Digest, Sha256};
use thiserror::Error;

/// A SHA-256 digest of a byte sequence.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    /// Compute the digest of `bytes`.
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        let mut digest = [0; 32];
        digest.copy_from_slice(&Sha256::digest(bytes));
        Self(digest)
    }

    /// Return the digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentDigest({self})")
    }
}

/// The bytes of a direct source and a reconstruction differ.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
pub enum MismatchError {
    /// The byte counts differ.
    #[error("length mismatch: direct source returned {direct} bytes, reconstruction has {reconstructed} bytes")]
    LengthMismatch {
        /// The number of bytes from the direct source.
        direct: usize,
        /// The number of reconstructed bytes.
        reconstructed: usize,
    },
    /// The byte counts are equal but the content digests differ.
    #[error("content mismatch over {length} bytes: direct digest {direct}, reconstructed digest {reconstructed}")]
    ContentMismatch {
        /// The number of bytes compared.
        length: usize,
        /// The digest of the direct source bytes.
        direct: ContentDigest,
        /// The digest of the reconstructed bytes.
        reconstructed: ContentDigest,
    },
}

/// Assert that `direct` and `reconstructed` hold the same bytes.
///
/// Lengths are compared first, and digests are only computed if the lengths match.
///
/// # Errors
/// Returns [`MismatchError::LengthMismatch`] if the lengths differ, or [`MismatchError::ContentMismatch`] if the content digests differ.
pub fn assert_equivalent(direct: &[u8], reconstructed: &[u8]) -> Result<(), MismatchError> {
    if direct.len() != reconstructed.len() {
        return Err(MismatchError::LengthMismatch {
            direct: direct.len(),
            reconstructed: reconstructed.len(),
        });
    }
    let direct_digest = ContentDigest::of(direct);
    let reconstructed_digest = ContentDigest::of(reconstructed);
    if direct_digest == reconstructed_digest {
        Ok(())
    } else {
        Err(MismatchError::ContentMismatch {
            length: direct.len(),
            direct: direct_digest,
            reconstructed: reconstructed_digest,
        })
    }
}
