use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Axis, PixelType, PixelsDimensions, PixelsIndexError};

/// The byte size of a pixel buffer does not fit in a [`u64`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[error("pixel buffer of {dimensions} {pixel_type} samples exceeds u64::MAX bytes")]
pub struct PixelsSizeError {
    dimensions: PixelsDimensions,
    pixel_type: PixelType,
}

/// Describes the layout of a pixel buffer: its dimensions and pixel type.
///
/// Samples are linearised in XYZCT order (X fastest).
/// All offsets and sizes returned by a descriptor are in bytes.
///
/// Serialises to the flat JSON object used by pixel file sidecars:
/// ```json
/// {"pixel_type": "uint16", "size_x": 10, "size_y": 10, "size_z": 1, "size_c": 1, "size_t": 1}
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelsDescriptor {
    /// The pixel type.
    pub pixel_type: PixelType,
    /// The dimensions.
    #[serde(flatten)]
    pub dimensions: PixelsDimensions,
}

impl PixelsDescriptor {
    /// Create a new pixels descriptor.
    #[must_use]
    pub const fn new(dimensions: PixelsDimensions, pixel_type: PixelType) -> Self {
        Self {
            pixel_type,
            dimensions,
        }
    }

    /// Check that every size of the pixel buffer fits in a [`u64`].
    ///
    /// The size and offset methods of a descriptor that passes validation do not overflow.
    ///
    /// # Errors
    /// Returns [`PixelsSizeError`] if the row, column, plane, stack, timepoint or total size exceeds [`u64::MAX`].
    pub fn validate(&self) -> Result<(), PixelsSizeError> {
        self.checked_total_size()
            .map(|_| ())
            .ok_or(PixelsSizeError {
                dimensions: self.dimensions,
                pixel_type: self.pixel_type,
            })
    }

    /// The size of the pixel buffer in bytes, or [`None`] if it or any intermediate size exceeds [`u64::MAX`].
    #[must_use]
    pub fn checked_total_size(&self) -> Option<u64> {
        let dimensions = &self.dimensions;
        let byte_width = self.byte_width();
        dimensions.size_y.checked_mul(byte_width)?;
        dimensions
            .size_x
            .checked_mul(byte_width)?
            .checked_mul(dimensions.size_y)?
            .checked_mul(dimensions.size_z)?
            .checked_mul(dimensions.size_c)?
            .checked_mul(dimensions.size_t)
    }

    /// The number of bytes per sample.
    #[must_use]
    pub const fn byte_width(&self) -> u64 {
        self.pixel_type.byte_width()
    }

    /// The size of a row in bytes.
    #[must_use]
    pub const fn row_size(&self) -> u64 {
        self.dimensions.size_x * self.byte_width()
    }

    /// The size of a column in bytes.
    #[must_use]
    pub const fn col_size(&self) -> u64 {
        self.dimensions.size_y * self.byte_width()
    }

    /// The size of a plane in bytes.
    #[must_use]
    pub const fn plane_size(&self) -> u64 {
        self.row_size() * self.dimensions.size_y
    }

    /// The size of a stack in bytes.
    #[must_use]
    pub const fn stack_size(&self) -> u64 {
        self.plane_size() * self.dimensions.size_z
    }

    /// The size of a timepoint in bytes.
    #[must_use]
    pub const fn timepoint_size(&self) -> u64 {
        self.stack_size() * self.dimensions.size_c
    }

    /// The size of the pixel buffer in bytes.
    #[must_use]
    pub const fn total_size(&self) -> u64 {
        self.timepoint_size() * self.dimensions.size_t
    }

    /// The byte offset of the row at (`y`, `z`, `c`, `t`).
    ///
    /// # Errors
    /// Returns [`PixelsIndexError`] if any index is out of bounds.
    pub fn row_offset(&self, y: u64, z: u64, c: u64, t: u64) -> Result<u64, PixelsIndexError> {
        self.dimensions.check_index(Axis::Y, y)?;
        Ok(self.plane_offset(z, c, t)? + y * self.row_size())
    }

    /// The byte offset of the plane at (`z`, `c`, `t`).
    ///
    /// # Errors
    /// Returns [`PixelsIndexError`] if any index is out of bounds.
    pub fn plane_offset(&self, z: u64, c: u64, t: u64) -> Result<u64, PixelsIndexError> {
        self.dimensions.check_index(Axis::Z, z)?;
        Ok(self.stack_offset(c, t)? + z * self.plane_size())
    }

    /// The byte offset of the stack at (`c`, `t`).
    ///
    /// # Errors
    /// Returns [`PixelsIndexError`] if any index is out of bounds.
    pub fn stack_offset(&self, c: u64, t: u64) -> Result<u64, PixelsIndexError> {
        self.dimensions.check_index(Axis::C, c)?;
        Ok(self.timepoint_offset(t)? + c * self.stack_size())
    }

    /// The byte offset of the timepoint at `t`.
    ///
    /// # Errors
    /// Returns [`PixelsIndexError`] if `t` is out of bounds.
    pub fn timepoint_offset(&self, t: u64) -> Result<u64, PixelsIndexError> {
        self.dimensions.check_index(Axis::T, t)?;
        Ok(t * self.timepoint_size())
    }

    /// The byte offset of the sample at `[x, y, z, c, t]`.
    ///
    /// # Errors
    /// Returns [`PixelsIndexError`] if any index is out of bounds.
    pub fn sample_offset(&self, indices: [u64; 5]) -> Result<u64, PixelsIndexError> {
        let [x, y, z, c, t] = indices;
        self.dimensions.check_index(Axis::X, x)?;
        Ok(self.row_offset(y, z, c, t)? + x * self.byte_width())
    }
}
