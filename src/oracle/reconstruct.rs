use crate::{
    byte_range::ByteRange,
    config::global_config,
    hypercube::{HypercubeError, HypercubeRequest},
    source::{RowHypercubeSourceTraits, SourceError},
};

/// Reconstruct the hypercube selected by `request` from a row source.
///
/// Rows are visited in canonical (T, C, Z, Y) order.
/// If the X step is one, each row contributes one contiguous read, otherwise each selected sample is read individually.
///
/// # Errors
/// Returns a [`SourceError`] if the source cannot be read or `request` exceeds the pixel array.
pub fn reconstruct_hypercube(
    source: &dyn RowHypercubeSourceTraits,
    request: &HypercubeRequest,
) -> Result<Vec<u8>, SourceError> {
    reconstruct(source, request, request.has_contiguous_rows())
}

/// Reconstruct the hypercube selected by `request` from a row source with one contiguous read per selected row.
///
/// The Y, Z, C and T axes may be stepped. The X step must be one.
///
/// # Errors
/// Returns a [`SourceError`] if the source cannot be read, `request` exceeds the pixel array, or the X step of `request` is not one.
pub fn reconstruct_solid(
    source: &dyn RowHypercubeSourceTraits,
    request: &HypercubeRequest,
) -> Result<Vec<u8>, SourceError> {
    reconstruct(source, request, true)
}

/// Reconstruct the hypercube selected by `request` from a row source with one read per sample.
///
/// # Errors
/// Returns a [`SourceError`] if the source cannot be read or `request` exceeds the pixel array.
pub fn reconstruct_strided(
    source: &dyn RowHypercubeSourceTraits,
    request: &HypercubeRequest,
) -> Result<Vec<u8>, SourceError> {
    reconstruct(source, request, false)
}

/// Return the byte ranges of the row source that make up `request`, in output order.
///
/// # Errors
/// Returns a [`SourceError`] if the source cannot be queried, `request` exceeds the pixel array, or `contiguous_rows` is requested with an X step other than one.
pub fn hypercube_byte_ranges(
    source: &dyn RowHypercubeSourceTraits,
    request: &HypercubeRequest,
    contiguous_rows: bool,
) -> Result<Vec<ByteRange>, SourceError> {
    if contiguous_rows && !request.has_contiguous_rows() {
        return Err(HypercubeError::NonUnitXStep(request.step()[0]).into());
    }
    request.validate(&source.descriptor()?.dimensions)?;

    let byte_width = source.byte_width()?;
    let rows = request.iter_rows();
    let mut byte_ranges = if contiguous_rows {
        Vec::with_capacity(rows.len())
    } else {
        Vec::with_capacity(usize::try_from(request.num_elements()).unwrap_or_default())
    };
    for row in rows {
        let offset = source.row_offset(row.y, row.z, row.c, row.t)?;
        if contiguous_rows {
            byte_ranges.push(ByteRange::new(
                offset + request.start()[0] * byte_width,
                request.size()[0] * byte_width,
            ));
        } else {
            byte_ranges.extend(
                request
                    .x_indices()
                    .map(|x| ByteRange::new(offset + x * byte_width, byte_width)),
            );
        }
    }
    Ok(byte_ranges)
}

fn reconstruct(
    source: &dyn RowHypercubeSourceTraits,
    request: &HypercubeRequest,
    contiguous_rows: bool,
) -> Result<Vec<u8>, SourceError> {
    let byte_ranges = hypercube_byte_ranges(source, request, contiguous_rows)?;
    let coalesce_region_reads = global_config().coalesce_region_reads();

    let length: u64 = byte_ranges.iter().map(ByteRange::length).sum();
    let mut out = Vec::with_capacity(usize::try_from(length).unwrap_or_default());
    if coalesce_region_reads {
        for region in source.get_regions(&byte_ranges)? {
            out.extend_from_slice(&region);
        }
    } else {
        for byte_range in byte_ranges {
            out.extend_from_slice(&source.get_region(byte_range)?);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        pixels::{PixelType, PixelsDescriptor, PixelsDimensions},
        source::{
            source_adapter::performance_metrics::PerformanceMetricsSourceAdapter,
            source_test, MemoryPixelsSource, PixelsGeometryTraits,
        },
    };

    use super::*;

    fn ten_by_ten() -> (PixelsDescriptor, Vec<u8>, MemoryPixelsSource) {
        let (descriptor, data) =
            source_test::ramp(PixelsDimensions::new(10, 10, 1, 1, 1), PixelType::Uint16);
        let source = MemoryPixelsSource::new(descriptor, data.clone()).unwrap();
        (descriptor, data, source)
    }

    #[test]
    fn reconstruct_solid_ten_by_ten() -> Result<(), Box<dyn std::error::Error>> {
        let (_, data, source) = ten_by_ten();
        let request = HypercubeRequest::new_solid([0; 5], [10, 10, 1, 1, 1]);
        let reconstructed = reconstruct_solid(&source, &request)?;
        assert_eq!(reconstructed.len(), 200);
        assert_eq!(reconstructed, data);
        Ok(())
    }

    #[test]
    fn reconstruct_solid_outer_steps() -> Result<(), Box<dyn std::error::Error>> {
        let (descriptor, data) =
            source_test::ramp(PixelsDimensions::new(6, 5, 4, 3, 2), PixelType::Uint16);
        let source = PerformanceMetricsSourceAdapter::new(Arc::new(MemoryPixelsSource::new(
            descriptor,
            data.clone(),
        )?));
        let request = HypercubeRequest::new([1, 0, 1, 0, 0], [4, 5, 3, 3, 2], [1, 2, 2, 2, 1])?;
        let reconstructed = reconstruct_solid(&source, &request)?;
        assert_eq!(
            reconstructed,
            source_test::expected_hypercube(&descriptor, &data, &request)
        );
        // y in {0, 2, 4}, z in {1, 3}, c in {0, 2}, t in {0, 1}
        assert_eq!(source.reads(), 3 * 2 * 2 * 2);
        assert_eq!(source.bytes_read(), reconstructed.len());
        assert_eq!(reconstruct_hypercube(&source, &request)?, reconstructed);

        let request = request.with_step([2, 2, 2, 2, 1])?;
        assert!(matches!(
            reconstruct_solid(&source, &request),
            Err(SourceError::InvalidRequest(HypercubeError::NonUnitXStep(2)))
        ));
        Ok(())
    }

    #[test]
    fn reconstruct_strided_ten_by_ten() -> Result<(), Box<dyn std::error::Error>> {
        let (descriptor, data, source) = ten_by_ten();
        let request = HypercubeRequest::new([0; 5], [10, 10, 1, 1, 1], [2, 2, 1, 1, 1])?;
        let reconstructed = reconstruct_strided(&source, &request)?;
        assert_eq!(reconstructed.len(), 50);
        assert_eq!(
            reconstructed,
            source_test::expected_hypercube(&descriptor, &data, &request)
        );
        assert_eq!(reconstruct_hypercube(&source, &request)?, reconstructed);
        Ok(())
    }

    #[test]
    fn reconstruct_lengths() -> Result<(), Box<dyn std::error::Error>> {
        let (descriptor, data) =
            source_test::ramp(PixelsDimensions::new(9, 7, 5, 4, 3), PixelType::Int32);
        let source = MemoryPixelsSource::new(descriptor, data.clone())?;
        let middle = HypercubeRequest::middle(&descriptor.dimensions);
        let solid = reconstruct_solid(&source, &middle)?;
        assert_eq!(
            solid.len() as u64,
            middle.size().iter().product::<u64>() * descriptor.byte_width()
        );
        for step in [[1, 1, 1, 1, 1], [2, 2, 1, 1, 1], [6, 5, 4, 3, 2], [1, 3, 2, 1, 2]] {
            let request = middle.with_step(step)?;
            let expected_len = descriptor.byte_width()
                * std::iter::zip(request.size(), request.step())
                    .map(|(size, step)| size.div_ceil(*step))
                    .product::<u64>();
            let strided = reconstruct_strided(&source, &request)?;
            assert_eq!(strided.len() as u64, expected_len);
            assert_eq!(strided, source_test::expected_hypercube(&descriptor, &data, &request));
            assert_eq!(reconstruct_hypercube(&source, &request)?, strided);
        }
        Ok(())
    }

    #[test]
    fn reconstruct_zero_size() -> Result<(), Box<dyn std::error::Error>> {
        let (_, _, source) = ten_by_ten();
        let request = HypercubeRequest::new_solid([0; 5], [10, 0, 1, 1, 1]);
        assert!(reconstruct_solid(&source, &request)?.is_empty());
        let request = HypercubeRequest::new_solid([3, 0, 0, 0, 0], [0, 10, 1, 1, 1]);
        assert!(reconstruct_solid(&source, &request)?.is_empty());
        let request = HypercubeRequest::new([0; 5], [10, 10, 0, 1, 1], [3, 3, 1, 1, 1])?;
        assert!(reconstruct_strided(&source, &request)?.is_empty());
        Ok(())
    }

    #[test]
    fn reconstruct_invalid() {
        let (_, _, source) = ten_by_ten();
        let request = HypercubeRequest::new_solid([1, 0, 0, 0, 0], [10, 10, 1, 1, 1]);
        assert!(matches!(
            reconstruct_solid(&source, &request),
            Err(SourceError::InvalidRequest(HypercubeError::OutOfBounds { .. }))
        ));

        // start + size wraps past u64::MAX
        let request =
            HypercubeRequest::from_slices(&[u64::MAX, 1, 0, 0, 0], &[1; 5], &[1; 5]).unwrap();
        for contiguous_rows in [true, false] {
            assert!(matches!(
                hypercube_byte_ranges(&source, &request, contiguous_rows),
                Err(SourceError::InvalidRequest(HypercubeError::OutOfBounds { .. }))
            ));
        }
        assert!(matches!(
            reconstruct_hypercube(&source, &request),
            Err(SourceError::InvalidRequest(HypercubeError::OutOfBounds { .. }))
        ));
        let request =
            HypercubeRequest::new([u64::MAX - 1, 0, 0, 0, 0], [3, 1, 1, 1, 1], [2, 1, 1, 1, 1])
                .unwrap();
        assert!(matches!(
            reconstruct_strided(&source, &request),
            Err(SourceError::InvalidRequest(HypercubeError::OutOfBounds { .. }))
        ));

        let request = HypercubeRequest::new([0; 5], [10, 10, 1, 1, 1], [2, 1, 1, 1, 1]).unwrap();
        assert!(matches!(
            hypercube_byte_ranges(&source, &request, true),
            Err(SourceError::InvalidRequest(HypercubeError::NonUnitXStep(2)))
        ));
        source.close().unwrap();
        assert!(matches!(
            reconstruct_solid(&source, &HypercubeRequest::new_solid([0; 5], [1; 5])),
            Err(SourceError::Closed)
        ));
    }

    #[test]
    fn reconstruct_read_counts() -> Result<(), Box<dyn std::error::Error>> {
        let (_, _, source) = ten_by_ten();
        let source = PerformanceMetricsSourceAdapter::new(Arc::new(source));

        let request = HypercubeRequest::new_solid([2, 1, 0, 0, 0], [6, 4, 1, 1, 1]);
        reconstruct_solid(&source, &request)?;
        assert_eq!(source.reads(), 4);
        assert_eq!(source.bytes_read(), 48);

        source.reset();
        let request = HypercubeRequest::new([2, 1, 0, 0, 0], [6, 4, 1, 1, 1], [2, 2, 1, 1, 1])?;
        reconstruct_strided(&source, &request)?;
        assert_eq!(source.reads(), 6);
        assert_eq!(source.bytes_read(), 12);
        Ok(())
    }

    #[test]
    fn reconstruct_byte_ranges() -> Result<(), Box<dyn std::error::Error>> {
        let (_, _, source) = ten_by_ten();
        let request = HypercubeRequest::new([1, 2, 0, 0, 0], [3, 2, 1, 1, 1], [2, 1, 1, 1, 1])?;
        assert_eq!(
            hypercube_byte_ranges(&source, &request, false)?,
            vec![
                ByteRange::new(42, 2),
                ByteRange::new(46, 2),
                ByteRange::new(62, 2),
                ByteRange::new(66, 2),
            ]
        );
        let request = HypercubeRequest::new_solid([1, 2, 0, 0, 0], [3, 2, 1, 1, 1]);
        assert_eq!(
            hypercube_byte_ranges(&source, &request, true)?,
            vec![ByteRange::new(42, 6), ByteRange::new(62, 6)]
        );
        Ok(())
    }
}
