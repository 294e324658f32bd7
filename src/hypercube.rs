//! Hypercube requests.
//!
//! A [`HypercubeRequest`] describes a strided, axis-aligned sub-region of a pixel array by its `start`, `size` and `step` along each of the X, Y, Z, C and T axes.
//! Along axis `i` the request selects the indices `start[i], start[i] + step[i], ...` below `start[i] + size[i]`.
//!
//! The canonical linearisation of a hypercube is T (outermost), then C, Z, Y and X (innermost), in ascending index order, regardless of the step.
//! Both [`IndicesIterator`] and [`RowIndicesIterator`] follow this order.

mod indices_iterator;

pub use indices_iterator::{IndicesIterator, RowIndex, RowIndicesIterator};

use derive_more::Display;
use thiserror::Error;

use crate::pixels::{Axis, PixelsDimensions};

/// Hypercube start indices, in XYZCT order.
pub type HypercubeStart = [u64; 5];

/// Hypercube sizes, in XYZCT order.
pub type HypercubeSize = [u64; 5];

/// Hypercube steps, in XYZCT order.
pub type HypercubeStep = [u64; 5];

/// The step of a solid hypercube request.
pub const SOLID_STEP: HypercubeStep = [1; 5];

/// A hypercube request.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
#[display("start {start:?} size {size:?} step {step:?}")]
pub struct HypercubeRequest {
    start: HypercubeStart,
    size: HypercubeSize,
    step: HypercubeStep,
}

/// A hypercube request error.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HypercubeError {
    /// A hypercube component does not have five elements.
    #[error("hypercube {0} has {1} elements, expected 5")]
    IncompatibleDimensionality(&'static str, usize),
    /// A step is zero.
    #[error("step along axis {0} must be at least 1")]
    ZeroStep(Axis),
    /// A contiguous row read was requested with an X step other than one.
    #[error("contiguous rows require an X step of 1, got {0}")]
    NonUnitXStep(u64),
    /// The request extends beyond the pixel array.
    #[error("hypercube {start}..{end} along axis {axis} exceeds size {extent}")]
    OutOfBounds {
        /// The axis.
        axis: Axis,
        /// The start index along the axis.
        start: u64,
        /// The exclusive end index along the axis.
        end: u64,
        /// The size of the pixel array along the axis.
        extent: u64,
    },
}

impl HypercubeRequest {
    /// Create a new hypercube request.
    ///
    /// # Errors
    /// Returns [`HypercubeError::ZeroStep`] if any step is zero.
    pub fn new(
        start: HypercubeStart,
        size: HypercubeSize,
        step: HypercubeStep,
    ) -> Result<Self, HypercubeError> {
        for (axis, step) in std::iter::zip(Axis::ALL, step) {
            if step == 0 {
                return Err(HypercubeError::ZeroStep(axis));
            }
        }
        Ok(Self { start, size, step })
    }

    /// Create a new solid hypercube request (unit step along every axis).
    #[must_use]
    pub const fn new_solid(start: HypercubeStart, size: HypercubeSize) -> Self {
        Self {
            start,
            size,
            step: SOLID_STEP,
        }
    }

    /// Create a new hypercube request from slices, such as those received from a remote API.
    ///
    /// # Errors
    /// Returns [`HypercubeError`] if any slice does not have five elements or any step is zero.
    pub fn from_slices(start: &[u64], size: &[u64], step: &[u64]) -> Result<Self, HypercubeError> {
        let to_array = |name: &'static str, values: &[u64]| {
            <[u64; 5]>::try_from(values)
                .map_err(|_| HypercubeError::IncompatibleDimensionality(name, values.len()))
        };
        Self::new(
            to_array("start", start)?,
            to_array("size", size)?,
            to_array("step", step)?,
        )
    }

    /// Create the solid "middle" hypercube of a pixel array.
    ///
    /// Along each axis of extent `n` the hypercube starts at `n / 3` and ends (exclusive) at `2 * n / 3 + 1`.
    #[must_use]
    pub fn middle(dimensions: &PixelsDimensions) -> Self {
        let extents = dimensions.to_array();
        let start = extents.map(|n| n / 3);
        let mut size = [0; 5];
        for (size, (&n, &start)) in size.iter_mut().zip(std::iter::zip(&extents, &start)) {
            // floor(2n / 3) without overflow
            let two_thirds = n - n.div_ceil(3);
            *size = (two_thirds + 1).saturating_sub(start);
        }
        Self::new_solid(start, size)
    }

    /// Return a copy of this request with a different step.
    ///
    /// # Errors
    /// Returns [`HypercubeError::ZeroStep`] if any step is zero.
    pub fn with_step(&self, step: HypercubeStep) -> Result<Self, HypercubeError> {
        Self::new(self.start, self.size, step)
    }

    /// Return the start of the request.
    #[must_use]
    pub const fn start(&self) -> &HypercubeStart {
        &self.start
    }

    /// Return the size of the request.
    #[must_use]
    pub const fn size(&self) -> &HypercubeSize {
        &self.size
    }

    /// Return the step of the request.
    #[must_use]
    pub const fn step(&self) -> &HypercubeStep {
        &self.step
    }

    /// Return the exclusive end of the request.
    ///
    /// An end beyond [`u64::MAX`] saturates.
    #[must_use]
    pub fn end_exc(&self) -> [u64; 5] {
        let mut end = self.start;
        for (end, size) in end.iter_mut().zip(self.size) {
            *end = end.saturating_add(size);
        }
        end
    }

    /// Returns true if the step is one along every axis.
    #[must_use]
    pub fn is_solid(&self) -> bool {
        self.step == SOLID_STEP
    }

    /// Returns true if the X step is one, so each row of the request is contiguous.
    #[must_use]
    pub const fn has_contiguous_rows(&self) -> bool {
        self.step[0] == 1
    }

    /// Return the number of selected indices along each axis, `ceil(size / step)`.
    #[must_use]
    pub fn stepped_shape(&self) -> [u64; 5] {
        let mut shape = [0; 5];
        for (shape, (size, step)) in shape.iter_mut().zip(std::iter::zip(self.size, self.step)) {
            *shape = size.div_ceil(step);
        }
        shape
    }

    /// Return the number of selected samples.
    ///
    /// Saturates at [`u64::MAX`]. A request that passes [`validate`](HypercubeRequest::validate) never saturates.
    #[must_use]
    pub fn num_elements(&self) -> u64 {
        self.stepped_shape()
            .iter()
            .fold(1, |product, &n| product.saturating_mul(n))
    }

    /// Return the number of bytes of the selected samples given a `byte_width`.
    #[must_use]
    pub fn num_bytes(&self, byte_width: u64) -> u64 {
        self.num_elements().saturating_mul(byte_width)
    }

    /// Validate the request against the dimensions of a pixel array.
    ///
    /// # Errors
    /// Returns [`HypercubeError::OutOfBounds`] if `start + size` exceeds the extent of any axis, including when it exceeds [`u64::MAX`].
    pub fn validate(&self, dimensions: &PixelsDimensions) -> Result<(), HypercubeError> {
        for (axis, start, size) in itertools::izip!(Axis::ALL, self.start, self.size) {
            let extent = dimensions.size(axis);
            match start.checked_add(size) {
                Some(end) if end <= extent => {}
                end => {
                    return Err(HypercubeError::OutOfBounds {
                        axis,
                        start,
                        end: end.unwrap_or(u64::MAX),
                        extent,
                    });
                }
            }
        }
        Ok(())
    }

    /// Return an iterator over the selected X indices.
    #[must_use]
    pub fn x_indices(&self) -> std::iter::StepBy<std::ops::Range<u64>> {
        let step = usize::try_from(self.step[0]).unwrap_or(usize::MAX);
        (self.start[0]..self.start[0].saturating_add(self.size[0])).step_by(step)
    }

    /// Return an iterator over the selected rows in canonical (T, C, Z, Y) order.
    #[must_use]
    pub fn iter_rows(&self) -> RowIndicesIterator {
        RowIndicesIterator::new(self)
    }

    /// Return an iterator over the selected `[x, y, z, c, t]` indices in canonical order.
    #[must_use]
    pub fn iter_indices(&self) -> IndicesIterator {
        IndicesIterator::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hypercube_request() {
        let request =
            HypercubeRequest::new([1, 2, 0, 0, 0], [5, 4, 1, 1, 1], [2, 3, 1, 1, 1]).unwrap();
        assert_eq!(request.end_exc(), [6, 6, 1, 1, 1]);
        assert_eq!(request.stepped_shape(), [3, 2, 1, 1, 1]);
        assert_eq!(request.num_elements(), 6);
        assert_eq!(request.num_bytes(4), 24);
        assert!(!request.is_solid());
        assert!(!request.has_contiguous_rows());
        assert_eq!(request.x_indices().collect::<Vec<_>>(), vec![1, 3, 5]);
        assert_eq!(
            request.to_string(),
            "start [1, 2, 0, 0, 0] size [5, 4, 1, 1, 1] step [2, 3, 1, 1, 1]"
        );

        assert_eq!(
            HypercubeRequest::new([0; 5], [1; 5], [1, 1, 0, 1, 1]),
            Err(HypercubeError::ZeroStep(Axis::Z))
        );
        assert!(HypercubeRequest::new_solid([0; 5], [1; 5]).is_solid());
    }

    #[test]
    fn hypercube_request_from_slices() {
        let request = HypercubeRequest::from_slices(&[0; 5], &[2; 5], &[1; 5]).unwrap();
        assert!(request.is_solid());
        assert_eq!(
            HypercubeRequest::from_slices(&[0; 5], &[2; 4], &[1; 5]),
            Err(HypercubeError::IncompatibleDimensionality("size", 4))
        );
    }

    #[test]
    fn hypercube_request_validate() {
        let dimensions = PixelsDimensions::new(10, 10, 1, 1, 1);
        assert!(HypercubeRequest::new_solid([0; 5], [10, 10, 1, 1, 1])
            .validate(&dimensions)
            .is_ok());
        assert!(HypercubeRequest::new_solid([10, 0, 0, 0, 0], [0, 10, 1, 1, 1])
            .validate(&dimensions)
            .is_ok());
        let err = HypercubeRequest::new_solid([5, 0, 0, 0, 0], [6, 10, 1, 1, 1])
            .validate(&dimensions)
            .unwrap_err();
        assert_eq!(err.to_string(), "hypercube 5..11 along axis X exceeds size 10");
    }

    #[test]
    fn hypercube_request_validate_overflow() {
        let dimensions = PixelsDimensions::new(10, 10, 1, 1, 1);
        let request =
            HypercubeRequest::from_slices(&[u64::MAX, 1, 0, 0, 0], &[1; 5], &[1; 5]).unwrap();
        assert_eq!(request.end_exc(), [u64::MAX, 2, 1, 1, 1]);
        assert_eq!(
            request.validate(&dimensions),
            Err(HypercubeError::OutOfBounds {
                axis: Axis::X,
                start: u64::MAX,
                end: u64::MAX,
                extent: 10
            })
        );

        let request =
            HypercubeRequest::new([0, u64::MAX - 1, 0, 0, 0], [1, 3, 1, 1, 1], [1, 2, 1, 1, 1])
                .unwrap();
        assert!(matches!(
            request.validate(&dimensions),
            Err(HypercubeError::OutOfBounds { axis: Axis::Y, .. })
        ));

        let request = HypercubeRequest::new_solid([0; 5], [u64::MAX; 5]);
        assert_eq!(request.num_elements(), u64::MAX);
        assert_eq!(request.num_bytes(2), u64::MAX);
        assert!(request.validate(&dimensions).is_err());
    }

    #[test]
    fn hypercube_request_stepped_shape() {
        let request = HypercubeRequest::new([0; 5], [10, 10, 1, 1, 1], [2, 2, 1, 1, 1]).unwrap();
        assert_eq!(request.num_bytes(2), 50);
        let request = HypercubeRequest::new([0; 5], [7, 9, 4, 3, 2], [6, 5, 4, 3, 2]).unwrap();
        assert_eq!(request.stepped_shape(), [2, 2, 1, 1, 1]);
        let request = HypercubeRequest::new([0; 5], [7, 0, 4, 3, 2], [6, 5, 4, 3, 2]).unwrap();
        assert_eq!(request.num_elements(), 0);
    }

    #[test]
    fn hypercube_request_middle() {
        let request = HypercubeRequest::middle(&PixelsDimensions::new(20, 20, 5, 1, 1));
        assert_eq!(request.start(), &[6, 6, 1, 0, 0]);
        assert_eq!(request.size(), &[8, 8, 3, 1, 1]);
        assert!(request
            .validate(&PixelsDimensions::new(20, 20, 5, 1, 1))
            .is_ok());

        let request = HypercubeRequest::middle(&PixelsDimensions::new(u64::MAX, 1, 1, 1, 1));
        assert_eq!(request.start()[0], u64::MAX / 3);
        assert_eq!(request.end_exc()[0], u64::MAX / 3 * 2 + 1);

        for n in 1..32 {
            let dimensions = PixelsDimensions::new(n, n, n, n, n);
            let request = HypercubeRequest::middle(&dimensions);
            assert!(request.validate(&dimensions).is_ok());
            assert!(request.num_elements() > 0);
        }
    }
}
