//! The hypercube equivalence oracle.
//!
//! The oracle checks that a [`DirectHypercubeSourceTraits`] source and a [`RowHypercubeSourceTraits`] source agree on the content of a pixel array.
//! Hypercubes are rebuilt from the row source with [`reconstruct_solid`] and [`reconstruct_strided`], and compared against the direct source with [`assert_equivalent`].
//!
//! A [`PixelsComparison`] holds a pair of sources for the duration of a comparison and closes both when it is closed or dropped.
//!
//! ```rust
//! # use std::sync::Arc;
//! use pixelcube::oracle::PixelsComparison;
//! use pixelcube::pixels::{PixelType, PixelsDescriptor, PixelsDimensions};
//! use pixelcube::source::MemoryPixelsSource;
//!
//! let descriptor = PixelsDescriptor::new(PixelsDimensions::new(10, 10, 1, 1, 1), PixelType::Uint16);
//! let data: Vec<u8> = (0..200).collect();
//! let direct = Arc::new(MemoryPixelsSource::new(descriptor, data.clone())?);
//! let row = Arc::new(MemoryPixelsSource::new(descriptor, data)?);
//!
//! let comparison = PixelsComparison::new(direct, row);
//! comparison.compare_all()?;
//! comparison.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod equivalence;
mod pixels_comparison;
mod reconstruct;

pub use equivalence::{assert_equivalent, ContentDigest, MismatchError};
pub use pixels_comparison::PixelsComparison;
pub use reconstruct::{
    hypercube_byte_ranges, reconstruct_hypercube, reconstruct_solid, reconstruct_strided,
};

use derive_more::Display;
use thiserror::Error;

use crate::{
    hypercube::{HypercubeError, HypercubeRequest},
    source::{
        DirectHypercubeSourceTraits, PixelsGeometryTraits, RowHypercubeSourceTraits, SourceError,
    },
};

/// A check performed by the oracle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display)]
pub enum Comparison {
    /// The pixels descriptor of the direct source.
    #[display("descriptor")]
    Descriptor,
    /// Sizes, byte widths and offsets.
    #[display("other getters")]
    OtherGetters,
    /// The middle row.
    #[display("row")]
    Row,
    /// The middle column.
    #[display("col")]
    Col,
    /// The middle plane.
    #[display("plane")]
    Plane,
    /// The middle stack.
    #[display("stack")]
    Stack,
    /// The middle timepoint.
    #[display("timepoint")]
    Timepoint,
    /// A hypercube.
    #[display("hypercube {_0}")]
    Hypercube(HypercubeRequest),
}

/// An oracle error.
#[derive(Debug, Error)]
pub enum OracleError {
    /// A source failed to answer.
    #[error("{check}: source unavailable: {source}")]
    SourceUnavailable {
        /// The failing check.
        check: Comparison,
        /// The source error.
        #[source]
        source: SourceError,
    },
    /// The bytes from the direct source and the row source differ.
    #[error("{check}: {source}")]
    Mismatch {
        /// The failing check.
        check: Comparison,
        /// The mismatch.
        #[source]
        source: MismatchError,
    },
    /// A getter returned different values from the direct source and the row source.
    #[error("{check}: {getter} differs, direct source returned {direct}, row source returned {row}")]
    GetterMismatch {
        /// The failing check.
        check: Comparison,
        /// The getter name.
        getter: &'static str,
        /// The value from the direct source.
        direct: u64,
        /// The value from the row source.
        row: u64,
    },
    /// A value differs from what the pixel layout requires.
    #[error("{check}: expected {getter} to be {expected}, got {actual}")]
    UnexpectedValue {
        /// The failing check.
        check: Comparison,
        /// The getter name.
        getter: &'static str,
        /// The expected value.
        expected: u64,
        /// The actual value.
        actual: u64,
    },
    /// A hypercube request could not be built.
    #[error("{check}: {source}")]
    InvalidRequest {
        /// The failing check.
        check: Comparison,
        /// The request error.
        #[source]
        source: HypercubeError,
    },
    /// A source could not be closed.
    #[error("failed to close a pixel source: {0}")]
    CloseError(SourceError),
}

impl OracleError {
    /// Return the failing check, if any.
    #[must_use]
    pub fn check(&self) -> Option<Comparison> {
        match self {
            Self::SourceUnavailable { check, .. }
            | Self::Mismatch { check, .. }
            | Self::GetterMismatch { check, .. }
            | Self::UnexpectedValue { check, .. }
            | Self::InvalidRequest { check, .. } => Some(*check),
            Self::CloseError(_) => None,
        }
    }
}

/// Attaches a [`Comparison`] to the outcomes of its individual checks.
#[derive(Copy, Clone)]
struct Check(Comparison);

impl Check {
    fn source<T>(self, result: Result<T, SourceError>) -> Result<T, OracleError> {
        result.map_err(|source| OracleError::SourceUnavailable {
            check: self.0,
            source,
        })
    }

    fn equal(self, getter: &'static str, direct: u64, row: u64) -> Result<(), OracleError> {
        if direct == row {
            Ok(())
        } else {
            Err(OracleError::GetterMismatch {
                check: self.0,
                getter,
                direct,
                row,
            })
        }
    }

    fn expect(self, getter: &'static str, expected: u64, actual: u64) -> Result<(), OracleError> {
        if expected == actual {
            Ok(())
        } else {
            Err(OracleError::UnexpectedValue {
                check: self.0,
                getter,
                expected,
                actual,
            })
        }
    }

    fn equivalent(self, direct: &[u8], reconstructed: &[u8]) -> Result<(), OracleError> {
        assert_equivalent(direct, reconstructed).map_err(|source| OracleError::Mismatch {
            check: self.0,
            source,
        })
    }
}

/// Compare the hypercube selected by `request` between a direct source and a reconstruction from a row source.
///
/// Solid requests are reconstructed with [`reconstruct_solid`] and all others with [`reconstruct_strided`].
/// The direct hypercube must hold exactly the number of bytes the request selects.
///
/// # Errors
/// Returns an [`OracleError`] tagged with [`Comparison::Hypercube`] if either source fails or the bytes differ.
pub fn compare_hypercube(
    direct: &dyn DirectHypercubeSourceTraits,
    row: &dyn RowHypercubeSourceTraits,
    request: &HypercubeRequest,
) -> Result<(), OracleError> {
    let check = Check(Comparison::Hypercube(*request));
    let direct_bytes = check.source(direct.get_hypercube(request))?;
    let reconstructed = if request.is_solid() {
        check.source(reconstruct_solid(row, request))?
    } else {
        check.source(reconstruct_strided(row, request))?
    };
    let byte_width = check.source(direct.byte_width())?;
    check.expect(
        "hypercube length",
        request.num_bytes(byte_width),
        direct_bytes.len() as u64,
    )?;
    check.equivalent(&direct_bytes, &reconstructed)
}

#[cfg(test)]
mod tests {
    use crate::{
        pixels::{PixelType, PixelsDescriptor, PixelsDimensions},
        source::MemoryPixelsSource,
    };

    use super::*;

    fn sources(dimensions: PixelsDimensions) -> (MemoryPixelsSource, MemoryPixelsSource) {
        let descriptor = PixelsDescriptor::new(dimensions, PixelType::Uint16);
        #[allow(clippy::cast_possible_truncation)]
        let data: Vec<u8> = (0..descriptor.total_size()).map(|i| (i % 253) as u8).collect();
        (
            MemoryPixelsSource::new(descriptor, data.clone()).unwrap(),
            MemoryPixelsSource::new(descriptor, data).unwrap(),
        )
    }

    #[test]
    fn oracle_compare_hypercube() {
        let (direct, row) = sources(PixelsDimensions::new(10, 10, 1, 1, 1));
        let solid = HypercubeRequest::new_solid([0; 5], [10, 10, 1, 1, 1]);
        compare_hypercube(&direct, &row, &solid).unwrap();
        let strided = solid.with_step([2, 2, 1, 1, 1]).unwrap();
        compare_hypercube(&direct, &row, &strided).unwrap();
    }

    #[test]
    fn oracle_compare_hypercube_mismatch() {
        let (direct, row) = sources(PixelsDimensions::new(10, 10, 1, 1, 1));
        row.store_region(57, &[255]).unwrap();
        let request = HypercubeRequest::new([0; 5], [10, 10, 1, 1, 1], [1, 2, 1, 1, 1]).unwrap();
        let err = compare_hypercube(&direct, &row, &request).unwrap_err();
        assert!(matches!(
            err,
            OracleError::Mismatch {
                source: MismatchError::ContentMismatch { length: 100, .. },
                ..
            }
        ));
        assert_eq!(err.check(), Some(Comparison::Hypercube(request)));

        // rows 1, 3, 5, 7 and 9 do not include the corrupted sample
        let request =
            HypercubeRequest::new([0, 1, 0, 0, 0], [10, 9, 1, 1, 1], [1, 2, 1, 1, 1]).unwrap();
        compare_hypercube(&direct, &row, &request).unwrap();
        let request = HypercubeRequest::new_solid([0; 5], [10, 2, 1, 1, 1]);
        compare_hypercube(&direct, &row, &request).unwrap();
    }

    #[test]
    fn oracle_compare_hypercube_unavailable() {
        let (direct, row) = sources(PixelsDimensions::new(4, 4, 2, 1, 1));
        row.close().unwrap();
        let request = HypercubeRequest::middle(&PixelsDimensions::new(4, 4, 2, 1, 1));
        let err = compare_hypercube(&direct, &row, &request).unwrap_err();
        assert!(matches!(
            err,
            OracleError::SourceUnavailable {
                source: SourceError::Closed,
                ..
            }
        ));
        assert!(err.to_string().starts_with("hypercube start"));
    }
}
