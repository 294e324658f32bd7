//! Byte ranges.
//!
//! A [`ByteRange`] addresses a contiguous region of a pixel buffer by its offset and length.
//! A [row source](crate::source::RowHypercubeSourceTraits) is read exclusively through byte ranges.
//!
//! [`extract_byte_ranges`] is a convenience function for extracting byte ranges from a slice of bytes.

use std::ops::Range;

use thiserror::Error;

/// A byte offset.
pub type ByteOffset = u64;

/// A byte length.
pub type ByteLength = u64;

/// A byte range.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ByteRange {
    offset: ByteOffset,
    length: ByteLength,
}

impl ByteRange {
    /// Create a new byte range of `length` bytes beginning at `offset`.
    #[must_use]
    pub const fn new(offset: ByteOffset, length: ByteLength) -> Self {
        Self { offset, length }
    }

    /// Return the start of the byte range.
    #[must_use]
    pub const fn start(&self) -> u64 {
        self.offset
    }

    /// Return the exclusive end of the byte range.
    ///
    /// Saturates at [`u64::MAX`].
    #[must_use]
    pub const fn end(&self) -> u64 {
        self.offset.saturating_add(self.length)
    }

    /// Return the length of the byte range.
    #[must_use]
    pub const fn length(&self) -> u64 {
        self.length
    }

    /// Returns true if the byte range is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Convert the byte range to a [`Range<u64>`].
    #[must_use]
    pub const fn to_range(&self) -> Range<u64> {
        self.start()..self.end()
    }

    /// Convert the byte range to a [`Range<usize>`].
    ///
    /// # Errors
    /// Returns [`InvalidByteRangeError`] if the byte range exceeds [`usize::MAX`].
    pub fn to_range_usize(&self) -> Result<Range<usize>, InvalidByteRangeError> {
        let start = usize::try_from(self.start());
        let end = self.offset.checked_add(self.length).map(usize::try_from);
        match (start, end) {
            (Ok(start), Some(Ok(end))) => Ok(start..end),
            _ => Err(InvalidByteRangeError(*self, usize::MAX as u64)),
        }
    }

    /// Returns true if the byte range lies within bytes of length `size`.
    #[must_use]
    pub const fn fits_within(&self, size: u64) -> bool {
        match self.offset.checked_add(self.length) {
            Some(end) => end <= size,
            None => false,
        }
    }
}

impl std::fmt::Display for ByteRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}..{}", self.start(), self.end())
    }
}

/// An invalid byte range error.
#[derive(Copy, Clone, Debug, Error)]
#[error("invalid byte range {0} for bytes of length {1}")]
pub struct InvalidByteRangeError(ByteRange, u64);

impl InvalidByteRangeError {
    /// Create a new [`InvalidByteRangeError`].
    #[must_use]
    pub fn new(byte_range: ByteRange, bytes_len: u64) -> Self {
        Self(byte_range, bytes_len)
    }

    /// Return the offending byte range.
    #[must_use]
    pub const fn byte_range(&self) -> ByteRange {
        self.0
    }
}

/// Validate that every byte range in `byte_ranges` lies within bytes of length `bytes_len`.
///
/// # Errors
/// Returns [`InvalidByteRangeError`] for the first byte range which does not.
pub fn validate_byte_ranges(
    byte_ranges: &[ByteRange],
    bytes_len: u64,
) -> Result<(), InvalidByteRangeError> {
    for byte_range in byte_ranges {
        if !byte_range.fits_within(bytes_len) {
            return Err(InvalidByteRangeError(*byte_range, bytes_len));
        }
    }
    Ok(())
}

/// Extract byte ranges from bytes.
///
/// # Errors
/// Returns [`InvalidByteRangeError`] if any bytes are requested beyond the end of `bytes`.
pub fn extract_byte_ranges(
    bytes: &[u8],
    byte_ranges: &[ByteRange],
) -> Result<Vec<Vec<u8>>, InvalidByteRangeError> {
    validate_byte_ranges(byte_ranges, bytes.len() as u64)?;
    byte_ranges
        .iter()
        .map(|byte_range| Ok(bytes[byte_range.to_range_usize()?].to_vec()))
        .collect()
}
