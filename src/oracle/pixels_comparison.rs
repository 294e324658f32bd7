use crate::{
    config::global_config,
    hypercube::HypercubeRequest,
    pixels::PixelsDimensions,
    source::{
        DirectHypercubeSource, DirectHypercubeSourceTraits, PixelsGeometryTraits,
        RowHypercubeSource, RowHypercubeSourceTraits,
    },
};

use super::{compare_hypercube, Check, Comparison, OracleError};

/// A comparison of a direct hypercube source and a row hypercube source over the same pixel array.
///
/// Each comparison reads the middle of the pixel array from both sources, see [`PixelsDimensions::middle`] and [`HypercubeRequest::middle`].
///
/// Both sources are closed by [`close`](PixelsComparison::close), which reports any errors.
/// If the comparison is dropped without being closed, both sources are closed and errors are ignored.
pub struct PixelsComparison {
    direct: DirectHypercubeSource,
    row: RowHypercubeSource,
    closed: bool,
}

impl PixelsComparison {
    /// Create a new comparison of `direct` and `row`.
    #[must_use]
    pub fn new(direct: DirectHypercubeSource, row: RowHypercubeSource) -> Self {
        Self {
            direct,
            row,
            closed: false,
        }
    }

    /// Return the direct source.
    #[must_use]
    pub fn direct(&self) -> &DirectHypercubeSource {
        &self.direct
    }

    /// Return the row source.
    #[must_use]
    pub fn row(&self) -> &RowHypercubeSource {
        &self.row
    }

    fn dimensions(&self, check: Check) -> Result<PixelsDimensions, OracleError> {
        Ok(check.source(self.direct.descriptor())?.dimensions)
    }

    /// Compare the total size and byte width of both sources, and their offsets if [enabled](crate::config::Config#compare-offsets).
    ///
    /// The direct source must report zero offsets at the origin, and both sources must agree on the offsets of the middle row, plane, stack and timepoint.
    ///
    /// # Errors
    /// Returns an [`OracleError`] tagged with [`Comparison::OtherGetters`] if a source fails or a value differs.
    pub fn compare_other_getters(&self) -> Result<(), OracleError> {
        let check = Check(Comparison::OtherGetters);
        let (direct, row) = (&self.direct, &self.row);
        check.equal(
            "total size",
            check.source(direct.total_size())?,
            check.source(row.total_size())?,
        )?;
        check.equal(
            "byte width",
            check.source(direct.byte_width())?,
            check.source(row.byte_width())?,
        )?;

        if !global_config().compare_offsets() {
            return Ok(());
        }
        check.expect("origin row offset", 0, check.source(direct.row_offset(0, 0, 0, 0))?)?;
        check.expect("origin plane offset", 0, check.source(direct.plane_offset(0, 0, 0))?)?;
        check.expect("origin stack offset", 0, check.source(direct.stack_offset(0, 0))?)?;
        check.expect("origin timepoint offset", 0, check.source(direct.timepoint_offset(0))?)?;

        let [_, y, z, c, t] = self.dimensions(check)?.middle();
        check.equal(
            "row offset",
            check.source(direct.row_offset(y, z, c, t))?,
            check.source(row.row_offset(y, z, c, t))?,
        )?;
        check.equal(
            "plane offset",
            check.source(direct.plane_offset(z, c, t))?,
            check.source(row.plane_offset(z, c, t))?,
        )?;
        check.equal(
            "stack offset",
            check.source(direct.stack_offset(c, t))?,
            check.source(row.stack_offset(c, t))?,
        )?;
        check.equal(
            "timepoint offset",
            check.source(direct.timepoint_offset(t))?,
            check.source(row.timepoint_offset(t))?,
        )
    }

    /// Compare the middle row of both sources.
    ///
    /// # Errors
    /// Returns an [`OracleError`] tagged with [`Comparison::Row`] if a source fails, the row sizes differ, or the rows differ.
    pub fn compare_row(&self) -> Result<(), OracleError> {
        let check = Check(Comparison::Row);
        let row_size = check.source(self.direct.row_size())?;
        check.equal("row size", row_size, check.source(self.row.row_size())?)?;

        let [_, y, z, c, t] = self.dimensions(check)?.middle();
        let direct = check.source(self.direct.get_row(y, z, c, t))?;
        check.expect("row length", row_size, direct.len() as u64)?;
        let row = check.source(self.row.get_row(y, z, c, t))?;
        check.equivalent(&direct, &row)
    }

    /// Compare the middle column of both sources.
    ///
    /// The column size of each source is derived from its own getters as `byte_width * plane_size / row_size`.
    /// The derived sizes must agree, and each source must report its own derived size.
    ///
    /// # Errors
    /// Returns an [`OracleError`] tagged with [`Comparison::Col`] if a source fails, a column size is unexpected, or the columns differ.
    pub fn compare_col(&self) -> Result<(), OracleError> {
        let check = Check(Comparison::Col);
        let col_size = derived_col_size(check, &*self.direct)?;
        let row_col_size = derived_col_size(check, &*self.row)?;
        check.equal("col size", col_size, row_col_size)?;
        check.expect("col size", col_size, check.source(self.direct.col_size())?)?;
        check.expect("col size", row_col_size, check.source(self.row.col_size())?)?;

        let [x, _, z, c, t] = self.dimensions(check)?.middle();
        let direct = check.source(self.direct.get_col(x, z, c, t))?;
        check.expect("col length", col_size, direct.len() as u64)?;
        let row = check.source(self.row.get_col(x, z, c, t))?;
        check.equivalent(&direct, &row)
    }

    /// Compare the middle plane of both sources.
    ///
    /// # Errors
    /// Returns an [`OracleError`] tagged with [`Comparison::Plane`] if a source fails, the plane sizes differ, or the planes differ.
    pub fn compare_plane(&self) -> Result<(), OracleError> {
        let check = Check(Comparison::Plane);
        let plane_size = check.source(self.direct.plane_size())?;
        check.equal("plane size", plane_size, check.source(self.row.plane_size())?)?;

        let [_, _, z, c, t] = self.dimensions(check)?.middle();
        let direct = check.source(self.direct.get_plane(z, c, t))?;
        check.expect("plane length", plane_size, direct.len() as u64)?;
        let row = check.source(self.row.get_plane(z, c, t))?;
        check.equivalent(&direct, &row)
    }

    /// Compare the middle stack of both sources.
    ///
    /// # Errors
    /// Returns an [`OracleError`] tagged with [`Comparison::Stack`] if a source fails, the stack sizes differ, or the stacks differ.
    pub fn compare_stack(&self) -> Result<(), OracleError> {
        let check = Check(Comparison::Stack);
        let stack_size = check.source(self.direct.stack_size())?;
        check.equal("stack size", stack_size, check.source(self.row.stack_size())?)?;

        let [_, _, _, c, t] = self.dimensions(check)?.middle();
        let direct = check.source(self.direct.get_stack(c, t))?;
        check.expect("stack length", stack_size, direct.len() as u64)?;
        let row = check.source(self.row.get_stack(c, t))?;
        check.equivalent(&direct, &row)
    }

    /// Compare the middle timepoint of both sources.
    ///
    /// # Errors
    /// Returns an [`OracleError`] tagged with [`Comparison::Timepoint`] if a source fails, the timepoint sizes differ, or the timepoints differ.
    pub fn compare_timepoint(&self) -> Result<(), OracleError> {
        let check = Check(Comparison::Timepoint);
        let timepoint_size = check.source(self.direct.timepoint_size())?;
        check.equal(
            "timepoint size",
            timepoint_size,
            check.source(self.row.timepoint_size())?,
        )?;

        let [_, _, _, _, t] = self.dimensions(check)?.middle();
        let direct = check.source(self.direct.get_timepoint(t))?;
        check.expect("timepoint length", timepoint_size, direct.len() as u64)?;
        let row = check.source(self.row.get_timepoint(t))?;
        check.equivalent(&direct, &row)
    }

    /// Compare the middle hypercube of both sources, solid and then with each of the [strided steps](crate::config::Config#strided-steps).
    ///
    /// # Errors
    /// Returns an [`OracleError`] tagged with [`Comparison::Hypercube`] for the first request that fails.
    pub fn compare_hypercube(&self) -> Result<(), OracleError> {
        let middle = HypercubeRequest::middle(&self.dimensions(Check(Comparison::Descriptor))?);
        self.compare_region(&middle)?;

        let strided_steps = global_config().strided_steps().to_vec();
        for step in strided_steps {
            let request = middle
                .with_step(step)
                .map_err(|source| OracleError::InvalidRequest {
                    check: Comparison::Hypercube(middle),
                    source,
                })?;
            self.compare_region(&request)?;
        }
        Ok(())
    }

    /// Compare the hypercube selected by `request`.
    ///
    /// # Errors
    /// Returns an [`OracleError`] tagged with [`Comparison::Hypercube`] if a source fails or the hypercubes differ.
    pub fn compare_region(&self, request: &HypercubeRequest) -> Result<(), OracleError> {
        compare_hypercube(self.direct.as_ref(), self.row.as_ref(), request)
    }

    /// Run every comparison, stopping at the first failure.
    ///
    /// The order is other getters, row, col, plane, stack, timepoint and hypercube.
    ///
    /// # Errors
    /// Returns the [`OracleError`] of the first failing comparison.
    pub fn compare_all(&self) -> Result<(), OracleError> {
        self.compare_other_getters()?;
        self.compare_row()?;
        self.compare_col()?;
        self.compare_plane()?;
        self.compare_stack()?;
        self.compare_timepoint()?;
        self.compare_hypercube()
    }

    /// Close both sources.
    ///
    /// Both sources are closed even if closing the direct source fails.
    ///
    /// # Errors
    /// Returns [`OracleError::CloseError`] with the first error encountered.
    pub fn close(mut self) -> Result<(), OracleError> {
        self.closed = true;
        let direct = self.direct.close();
        let row = self.row.close();
        direct.and(row).map_err(OracleError::CloseError)
    }
}

impl Drop for PixelsComparison {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.direct.close();
            let _ = self.row.close();
        }
    }
}

impl std::fmt::Debug for PixelsComparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixelsComparison")
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

/// The column size implied by the geometry getters of `source`.
fn derived_col_size<TSource: PixelsGeometryTraits + ?Sized>(
    check: Check,
    source: &TSource,
) -> Result<u64, OracleError> {
    let byte_width = check.source(source.byte_width())?;
    let plane_size = check.source(source.plane_size())?;
    let row_size = check.source(source.row_size())?;
    let col_size = (u128::from(byte_width) * u128::from(plane_size))
        .checked_div(u128::from(row_size))
        .unwrap_or(0);
    Ok(u64::try_from(col_size).unwrap_or(u64::MAX))
}
