use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An axis of a pixel array.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum Axis {
    /// The X axis (columns within a row).
    #[display("X")]
    X,
    /// The Y axis (rows within a plane).
    #[display("Y")]
    Y,
    /// The Z axis (planes within a stack).
    #[display("Z")]
    Z,
    /// The channel axis.
    #[display("C")]
    C,
    /// The time axis.
    #[display("T")]
    T,
}

impl Axis {
    /// All axes in XYZCT order.
    pub const ALL: [Axis; 5] = [Axis::X, Axis::Y, Axis::Z, Axis::C, Axis::T];
}

/// The dimensions of a pixel array, in XYZCT order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[display("{size_x}x{size_y}x{size_z}x{size_c}x{size_t}")]
pub struct PixelsDimensions {
    /// The number of samples along X.
    pub size_x: u64,
    /// The number of samples along Y.
    pub size_y: u64,
    /// The number of Z sections.
    pub size_z: u64,
    /// The number of channels.
    pub size_c: u64,
    /// The number of timepoints.
    pub size_t: u64,
}

/// A pixel index is outside the dimensions of a pixel array.
#[derive(Copy, Clone, Debug, Error, PartialEq, Eq)]
#[error("index {index} along axis {axis} is out of bounds for size {size}")]
pub struct PixelsIndexError {
    axis: Axis,
    index: u64,
    size: u64,
}

impl PixelsIndexError {
    /// Create a new [`PixelsIndexError`].
    #[must_use]
    pub const fn new(axis: Axis, index: u64, size: u64) -> Self {
        Self { axis, index, size }
    }

    /// The axis of the offending index.
    #[must_use]
    pub const fn axis(&self) -> Axis {
        self.axis
    }
}

impl PixelsDimensions {
    /// Create new pixels dimensions.
    #[must_use]
    pub const fn new(size_x: u64, size_y: u64, size_z: u64, size_c: u64, size_t: u64) -> Self {
        Self {
            size_x,
            size_y,
            size_z,
            size_c,
            size_t,
        }
    }

    /// Return the dimensions as an `[x, y, z, c, t]` array.
    #[must_use]
    pub const fn to_array(&self) -> [u64; 5] {
        [
            self.size_x,
            self.size_y,
            self.size_z,
            self.size_c,
            self.size_t,
        ]
    }

    /// Return the size along `axis`.
    #[must_use]
    pub const fn size(&self, axis: Axis) -> u64 {
        match axis {
            Axis::X => self.size_x,
            Axis::Y => self.size_y,
            Axis::Z => self.size_z,
            Axis::C => self.size_c,
            Axis::T => self.size_t,
        }
    }

    /// Return the number of samples in the pixel array.
    #[must_use]
    pub const fn num_elements(&self) -> u64 {
        self.size_x * self.size_y * self.size_z * self.size_c * self.size_t
    }

    /// Return the middle index along every axis.
    #[must_use]
    pub const fn middle(&self) -> [u64; 5] {
        [
            self.size_x / 2,
            self.size_y / 2,
            self.size_z / 2,
            self.size_c / 2,
            self.size_t / 2,
        ]
    }

    /// Check that `index` is within the bounds of `axis`.
    ///
    /// # Errors
    /// Returns [`PixelsIndexError`] if `index` is greater than or equal to the size of `axis`.
    pub fn check_index(&self, axis: Axis, index: u64) -> Result<(), PixelsIndexError> {
        let size = self.size(axis);
        if index < size {
            Ok(())
        } else {
            Err(PixelsIndexError::new(axis, index, size))
        }
    }
}

impl From<[u64; 5]> for PixelsDimensions {
    fn from(sizes: [u64; 5]) -> Self {
        let [size_x, size_y, size_z, size_c, size_t] = sizes;
        Self::new(size_x, size_y, size_z, size_c, size_t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixels_dimensions() {
        let dimensions = PixelsDimensions::new(10, 8, 3, 2, 5);
        assert_eq!(dimensions.to_array(), [10, 8, 3, 2, 5]);
        assert_eq!(PixelsDimensions::from([10, 8, 3, 2, 5]), dimensions);
        assert_eq!(dimensions.num_elements(), 2400);
        assert_eq!(dimensions.middle(), [5, 4, 1, 1, 2]);
        assert_eq!(dimensions.to_string(), "10x8x3x2x5");
        for (axis, size) in std::iter::zip(Axis::ALL, dimensions.to_array()) {
            assert_eq!(dimensions.size(axis), size);
        }
    }

    #[test]
    fn pixels_dimensions_check_index() {
        let dimensions = PixelsDimensions::new(10, 8, 3, 2, 5);
        assert!(dimensions.check_index(Axis::Y, 7).is_ok());
        let err = dimensions.check_index(Axis::C, 2).unwrap_err();
        assert_eq!(err.axis(), Axis::C);
        assert_eq!(
            err.to_string(),
            "index 2 along axis C is out of bounds for size 2"
        );
    }
}
