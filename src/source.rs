//! Pixel sources.
//!
//! A pixel source gives access to the bytes of a single pixel array.
//! Two kinds of source are cross-validated by the [oracle](crate::oracle):
//! - a [`DirectHypercubeSourceTraits`] source can fetch arbitrary strided hypercubes, rows, columns, planes, stacks and timepoints directly, and
//! - a [`RowHypercubeSourceTraits`] source can only report offsets and return raw [byte ranges](crate::byte_range::ByteRange) of the pixel buffer.
//!
//! Both share the [`PixelsGeometryTraits`] interface for the pixel layout.
//! Its provided methods compute sizes and offsets from the [`PixelsDescriptor`], but a source may override them, for example to answer from a remote service.
//!
//! This module includes an in-memory [`MemoryPixelsSource`] and an on-disk [`FilesystemPixelsSource`], and the [`source_adapter`] module includes adapters for logging and metrics.

mod filesystem_source;
mod memory_source;
pub mod source_adapter;


use std::sync::Arc;

use thiserror::Error;

use crate::{
    byte_range::{ByteRange, InvalidByteRangeError},
    hypercube::{HypercubeError, HypercubeRequest},
    pixels::{Axis, PixelsDescriptor, PixelsIndexError, PixelsSizeError},
};

pub use filesystem_source::FilesystemPixelsSource;
pub use memory_source::MemoryPixelsSource;

/// [`Arc`] wrapped direct hypercube source.
pub type DirectHypercubeSource = Arc<dyn DirectHypercubeSourceTraits>;

/// [`Arc`] wrapped row hypercube source.
pub type RowHypercubeSource = Arc<dyn RowHypercubeSourceTraits>;

/// The layout of the pixel array behind a source.
pub trait PixelsGeometryTraits: Send + Sync {
    /// Return the descriptor of the pixel array.
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be queried.
    fn descriptor(&self) -> Result<PixelsDescriptor, SourceError>;

    /// Return the number of bytes per sample.
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be queried.
    fn byte_width(&self) -> Result<u64, SourceError> {
        Ok(self.descriptor()?.byte_width())
    }

    /// Return the byte offset of the row at (`y`, `z`, `c`, `t`).
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be queried or an index is out of bounds.
    fn row_offset(&self, y: u64, z: u64, c: u64, t: u64) -> Result<u64, SourceError> {
        Ok(self.descriptor()?.row_offset(y, z, c, t)?)
    }

    /// Return the byte offset of the plane at (`z`, `c`, `t`).
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be queried or an index is out of bounds.
    fn plane_offset(&self, z: u64, c: u64, t: u64) -> Result<u64, SourceError> {
        Ok(self.descriptor()?.plane_offset(z, c, t)?)
    }

    /// Return the byte offset of the stack at (`c`, `t`).
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be queried or an index is out of bounds.
    fn stack_offset(&self, c: u64, t: u64) -> Result<u64, SourceError> {
        Ok(self.descriptor()?.stack_offset(c, t)?)
    }

    /// Return the byte offset of the timepoint at `t`.
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be queried or `t` is out of bounds.
    fn timepoint_offset(&self, t: u64) -> Result<u64, SourceError> {
        Ok(self.descriptor()?.timepoint_offset(t)?)
    }

    /// Return the size of a row in bytes.
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be queried.
    fn row_size(&self) -> Result<u64, SourceError> {
        Ok(self.descriptor()?.row_size())
    }

    /// Return the size of a column in bytes.
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be queried.
    fn col_size(&self) -> Result<u64, SourceError> {
        Ok(self.descriptor()?.col_size())
    }

    /// Return the size of a plane in bytes.
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be queried.
    fn plane_size(&self) -> Result<u64, SourceError> {
        Ok(self.descriptor()?.plane_size())
    }

    /// Return the size of a stack in bytes.
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be queried.
    fn stack_size(&self) -> Result<u64, SourceError> {
        Ok(self.descriptor()?.stack_size())
    }

    /// Return the size of a timepoint in bytes.
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be queried.
    fn timepoint_size(&self) -> Result<u64, SourceError> {
        Ok(self.descriptor()?.timepoint_size())
    }

    /// Return the size of the pixel buffer in bytes.
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be queried.
    fn total_size(&self) -> Result<u64, SourceError> {
        Ok(self.descriptor()?.total_size())
    }

    /// Release the source.
    ///
    /// Reads from a closed source fail with [`SourceError::Closed`].
    /// Closing an already closed source succeeds.
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source could not be released cleanly.
    fn close(&self) -> Result<(), SourceError> {
        Ok(())
    }
}

/// A source which can only return raw byte regions of the pixel buffer.
pub trait RowHypercubeSourceTraits: PixelsGeometryTraits {
    /// Retrieve the bytes in `byte_range`.
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be read or `byte_range` lies beyond the pixel buffer.
    fn get_region(&self, byte_range: ByteRange) -> Result<Vec<u8>, SourceError>;

    /// Retrieve the bytes in each of `byte_ranges`.
    ///
    /// The default implementation calls [`get_region`](RowHypercubeSourceTraits::get_region) for each byte range in turn.
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be read or any byte range lies beyond the pixel buffer.
    fn get_regions(&self, byte_ranges: &[ByteRange]) -> Result<Vec<Vec<u8>>, SourceError> {
        byte_ranges
            .iter()
            .map(|byte_range| self.get_region(*byte_range))
            .collect()
    }

    /// Retrieve the row at (`y`, `z`, `c`, `t`).
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be read or an index is out of bounds.
    fn get_row(&self, y: u64, z: u64, c: u64, t: u64) -> Result<Vec<u8>, SourceError> {
        let offset = self.row_offset(y, z, c, t)?;
        self.get_region(ByteRange::new(offset, self.row_size()?))
    }

    /// Retrieve the column at (`x`, `z`, `c`, `t`).
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be read or an index is out of bounds.
    fn get_col(&self, x: u64, z: u64, c: u64, t: u64) -> Result<Vec<u8>, SourceError> {
        let descriptor = self.descriptor()?;
        descriptor.dimensions.check_index(Axis::X, x)?;
        let byte_width = self.byte_width()?;
        let byte_ranges = (0..descriptor.dimensions.size_y)
            .map(|y| {
                Ok(ByteRange::new(
                    self.row_offset(y, z, c, t)? + x * byte_width,
                    byte_width,
                ))
            })
            .collect::<Result<Vec<_>, SourceError>>()?;
        Ok(self.get_regions(&byte_ranges)?.concat())
    }

    /// Retrieve the plane at (`z`, `c`, `t`).
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be read or an index is out of bounds.
    fn get_plane(&self, z: u64, c: u64, t: u64) -> Result<Vec<u8>, SourceError> {
        let offset = self.plane_offset(z, c, t)?;
        self.get_region(ByteRange::new(offset, self.plane_size()?))
    }

    /// Retrieve the stack at (`c`, `t`).
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be read or an index is out of bounds.
    fn get_stack(&self, c: u64, t: u64) -> Result<Vec<u8>, SourceError> {
        let offset = self.stack_offset(c, t)?;
        self.get_region(ByteRange::new(offset, self.stack_size()?))
    }

    /// Retrieve the timepoint at `t`.
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be read or `t` is out of bounds.
    fn get_timepoint(&self, t: u64) -> Result<Vec<u8>, SourceError> {
        let offset = self.timepoint_offset(t)?;
        self.get_region(ByteRange::new(offset, self.timepoint_size()?))
    }
}

/// A source which can fetch arbitrary strided hypercubes directly.
///
/// The provided methods retrieve rows, columns, planes, stacks and timepoints as solid hypercubes.
pub trait DirectHypercubeSourceTraits: PixelsGeometryTraits {
    /// Retrieve the samples selected by `request` in canonical (T, C, Z, Y, X) order.
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be read or `request` exceeds the pixel array.
    fn get_hypercube(&self, request: &HypercubeRequest) -> Result<Vec<u8>, SourceError>;

    /// Retrieve the row at (`y`, `z`, `c`, `t`).
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be read or an index is out of bounds.
    fn get_row(&self, y: u64, z: u64, c: u64, t: u64) -> Result<Vec<u8>, SourceError> {
        let dimensions = self.descriptor()?.dimensions;
        dimensions.check_index(Axis::Y, y)?;
        self.get_hypercube(&HypercubeRequest::new_solid(
            [0, y, z, c, t],
            [dimensions.size_x, 1, 1, 1, 1],
        ))
    }

    /// Retrieve the column at (`x`, `z`, `c`, `t`).
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be read or an index is out of bounds.
    fn get_col(&self, x: u64, z: u64, c: u64, t: u64) -> Result<Vec<u8>, SourceError> {
        let dimensions = self.descriptor()?.dimensions;
        dimensions.check_index(Axis::X, x)?;
        self.get_hypercube(&HypercubeRequest::new_solid(
            [x, 0, z, c, t],
            [1, dimensions.size_y, 1, 1, 1],
        ))
    }

    /// Retrieve the plane at (`z`, `c`, `t`).
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be read or an index is out of bounds.
    fn get_plane(&self, z: u64, c: u64, t: u64) -> Result<Vec<u8>, SourceError> {
        let dimensions = self.descriptor()?.dimensions;
        self.get_hypercube(&HypercubeRequest::new_solid(
            [0, 0, z, c, t],
            [dimensions.size_x, dimensions.size_y, 1, 1, 1],
        ))
    }

    /// Retrieve the stack at (`c`, `t`).
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be read or an index is out of bounds.
    fn get_stack(&self, c: u64, t: u64) -> Result<Vec<u8>, SourceError> {
        let dimensions = self.descriptor()?.dimensions;
        self.get_hypercube(&HypercubeRequest::new_solid(
            [0, 0, 0, c, t],
            [dimensions.size_x, dimensions.size_y, dimensions.size_z, 1, 1],
        ))
    }

    /// Retrieve the timepoint at `t`.
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the source cannot be read or `t` is out of bounds.
    fn get_timepoint(&self, t: u64) -> Result<Vec<u8>, SourceError> {
        let dimensions = self.descriptor()?.dimensions;
        self.get_hypercube(&HypercubeRequest::new_solid(
            [0, 0, 0, 0, t],
            [
                dimensions.size_x,
                dimensions.size_y,
                dimensions.size_z,
                dimensions.size_c,
                1,
            ],
        ))
    }
}

/// A pixel source error.
#[derive(Debug, Error)]
pub enum SourceError {
    /// An IO error.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// The source has been closed.
    #[error("the pixel source has been closed")]
    Closed,
    /// An invalid byte range.
    #[error("invalid byte range {0}")]
    InvalidByteRangeError(#[from] InvalidByteRangeError),
    /// An invalid hypercube request.
    #[error("invalid hypercube request: {0}")]
    InvalidRequest(#[from] HypercubeError),
    /// A pixel index is out of bounds.
    #[error(transparent)]
    InvalidIndex(#[from] PixelsIndexError),
    /// An error parsing a pixels descriptor.
    #[error("invalid pixels descriptor: {0}")]
    InvalidDescriptor(#[from] serde_json::Error),
    /// The pixel buffer size of a descriptor does not fit in a `u64`.
    #[error(transparent)]
    InvalidSize(#[from] PixelsSizeError),
    /// The pixel buffer size does not match its descriptor.
    #[error("pixel buffer has {0} bytes, expected {1}")]
    SizeMismatch(u64, u64),
    /// The element size of typed data does not match the pixel type.
    #[error("element size {0} is incompatible with byte width {1}")]
    IncompatibleElementSize(usize, u64),
    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl From<&str> for SourceError {
    fn from(err: &str) -> Self {
        Self::Other(err.to_string())
    }
}

impl From<String> for SourceError {
    fn from(err: String) -> Self {
        Self::Other(err)
    }
}
