//! Pixel arrays.
//!
//! A pixel array is a 5-dimensional array indexed by (X, Y, Z, Channel, Time) with a fixed [`PixelType`].
//! Its samples are linearised in XYZCT order: X varies fastest, T slowest.
//!
//! A [`PixelsDescriptor`] combines [`PixelsDimensions`] with a [`PixelType`] and computes the byte sizes and offsets of rows, planes, stacks and timepoints.

mod pixel_type;
mod pixels_descriptor;
mod pixels_dimensions;

pub use pixel_type::{PixelType, UnsupportedPixelTypeError};
pub use pixels_descriptor::{PixelsDescriptor, PixelsSizeError};
pub use pixels_dimensions::{Axis, PixelsDimensions, PixelsIndexError};
