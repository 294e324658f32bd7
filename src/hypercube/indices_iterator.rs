use std::iter::FusedIterator;

use itertools::izip;

use super::HypercubeRequest;

/// The (y, z, c, t) indices of a row of samples along X.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RowIndex {
    /// The Y index.
    pub y: u64,
    /// The Z index.
    pub z: u64,
    /// The channel index.
    pub c: u64,
    /// The time index.
    pub t: u64,
}

impl RowIndex {
    /// Create a new row index.
    #[must_use]
    pub const fn new(y: u64, z: u64, c: u64, t: u64) -> Self {
        Self { y, z, c, t }
    }
}

/// Stepped iteration state shared by the indices iterators.
///
/// The first axis varies fastest.
#[derive(Clone, Debug)]
struct SteppedIndices<const N: usize> {
    start: [u64; N],
    step: [u64; N],
    shape: [u64; N],
    index: u64,
    num_elements: u64,
}

impl<const N: usize> SteppedIndices<N> {
    fn new(start: [u64; N], step: [u64; N], shape: [u64; N]) -> Self {
        Self {
            start,
            step,
            shape,
            index: 0,
            num_elements: shape.iter().product(),
        }
    }

    fn next(&mut self) -> Option<[u64; N]> {
        if self.index >= self.num_elements {
            return None;
        }
        let mut current = self.index;
        let mut indices = [0; N];
        for (out, &start, &step, &shape) in
            izip!(indices.iter_mut(), &self.start, &self.step, &self.shape)
        {
            *out = start + (current % shape) * step;
            current /= shape;
        }
        self.index += 1;
        Some(indices)
    }

    fn remaining(&self) -> usize {
        usize::try_from(self.num_elements - self.index).unwrap_or(usize::MAX)
    }
}

/// Iterates over the `[x, y, z, c, t]` indices selected by a [`HypercubeRequest`].
///
/// Indices are produced in canonical order: T outermost, X innermost.
#[derive(Clone, Debug)]
pub struct IndicesIterator(SteppedIndices<5>);

impl IndicesIterator {
    /// Create a new indices iterator.
    #[must_use]
    pub fn new(request: &HypercubeRequest) -> Self {
        Self(SteppedIndices::new(
            *request.start(),
            *request.step(),
            request.stepped_shape(),
        ))
    }
}

impl Iterator for IndicesIterator {
    type Item = [u64; 5];

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.0.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for IndicesIterator {}

impl FusedIterator for IndicesIterator {}

/// Iterates over the rows selected by a [`HypercubeRequest`].
///
/// Rows are produced in canonical order: T outermost, then C, Z and Y.
#[derive(Clone, Debug)]
pub struct RowIndicesIterator(SteppedIndices<4>);

impl RowIndicesIterator {
    /// Create a new row indices iterator.
    #[must_use]
    pub fn new(request: &HypercubeRequest) -> Self {
        let [_, start @ ..] = *request.start();
        let [_, step @ ..] = *request.step();
        let [_, shape @ ..] = request.stepped_shape();
        Self(SteppedIndices::new(start, step, shape))
    }
}

impl Iterator for RowIndicesIterator {
    type Item = RowIndex;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|[y, z, c, t]| RowIndex { y, z, c, t })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.0.remaining();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RowIndicesIterator {}

impl FusedIterator for RowIndicesIterator {}
