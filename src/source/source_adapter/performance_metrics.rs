//! A pixel source adapter which records performance metrics.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use crate::{
    byte_range::ByteRange,
    hypercube::HypercubeRequest,
    pixels::PixelsDescriptor,
    source::{
        DirectHypercubeSourceTraits, PixelsGeometryTraits, RowHypercubeSourceTraits, SourceError,
    },
};

/// The performance metrics source adapter. Accumulates metrics, such as bytes read and read requests.
///
/// It is intended to aid in testing by allowing the application to validate that metrics match expected values for specific operations.
/// A batched [`get_regions`](RowHypercubeSourceTraits::get_regions) call counts as one read request.
#[derive(Debug)]
pub struct PerformanceMetricsSourceAdapter<TSource: ?Sized> {
    source: Arc<TSource>,
    bytes_read: AtomicUsize,
    reads: AtomicUsize,
}

impl<TSource: ?Sized> PerformanceMetricsSourceAdapter<TSource> {
    /// Create a new performance metrics source adapter.
    #[must_use]
    pub fn new(source: Arc<TSource>) -> Self {
        Self {
            source,
            bytes_read: AtomicUsize::default(),
            reads: AtomicUsize::default(),
        }
    }

    /// Returns the number of bytes read.
    pub fn bytes_read(&self) -> usize {
        self.bytes_read.load(Ordering::Relaxed)
    }

    /// Returns the number of read requests.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    /// Reset all metrics to zero.
    pub fn reset(&self) {
        self.bytes_read.store(0, Ordering::Relaxed);
        self.reads.store(0, Ordering::Relaxed);
    }

    fn record<T: AsRef<[u8]>>(&self, result: &Result<Vec<T>, SourceError>) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        if let Ok(regions) = result {
            let len: usize = regions.iter().map(|region| region.as_ref().len()).sum();
            self.bytes_read.fetch_add(len, Ordering::Relaxed);
        }
    }

    fn record_one(&self, result: Result<Vec<u8>, SourceError>) -> Result<Vec<u8>, SourceError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        if let Ok(bytes) = &result {
            self.bytes_read.fetch_add(bytes.len(), Ordering::Relaxed);
        }
        result
    }
}

impl<TSource: ?Sized + PixelsGeometryTraits> PixelsGeometryTraits
    for PerformanceMetricsSourceAdapter<TSource>
{
    fn descriptor(&self) -> Result<PixelsDescriptor, SourceError> {
        self.source.descriptor()
    }

    fn byte_width(&self) -> Result<u64, SourceError> {
        self.source.byte_width()
    }

    fn row_offset(&self, y: u64, z: u64, c: u64, t: u64) -> Result<u64, SourceError> {
        self.source.row_offset(y, z, c, t)
    }

    fn plane_offset(&self, z: u64, c: u64, t: u64) -> Result<u64, SourceError> {
        self.source.plane_offset(z, c, t)
    }

    fn stack_offset(&self, c: u64, t: u64) -> Result<u64, SourceError> {
        self.source.stack_offset(c, t)
    }

    fn timepoint_offset(&self, t: u64) -> Result<u64, SourceError> {
        self.source.timepoint_offset(t)
    }

    fn row_size(&self) -> Result<u64, SourceError> {
        self.source.row_size()
    }

    fn col_size(&self) -> Result<u64, SourceError> {
        self.source.col_size()
    }

    fn plane_size(&self) -> Result<u64, SourceError> {
        self.source.plane_size()
    }

    fn stack_size(&self) -> Result<u64, SourceError> {
        self.source.stack_size()
    }

    fn timepoint_size(&self) -> Result<u64, SourceError> {
        self.source.timepoint_size()
    }

    fn total_size(&self) -> Result<u64, SourceError> {
        self.source.total_size()
    }

    fn close(&self) -> Result<(), SourceError> {
        self.source.close()
    }
}

impl<TSource: ?Sized + RowHypercubeSourceTraits> RowHypercubeSourceTraits
    for PerformanceMetricsSourceAdapter<TSource>
{
    fn get_region(&self, byte_range: ByteRange) -> Result<Vec<u8>, SourceError> {
        self.record_one(self.source.get_region(byte_range))
    }

    fn get_regions(&self, byte_ranges: &[ByteRange]) -> Result<Vec<Vec<u8>>, SourceError> {
        let result = self.source.get_regions(byte_ranges);
        self.record(&result);
        result
    }
}

impl<TSource: ?Sized + DirectHypercubeSourceTraits> DirectHypercubeSourceTraits
    for PerformanceMetricsSourceAdapter<TSource>
{
    fn get_hypercube(&self, request: &HypercubeRequest) -> Result<Vec<u8>, SourceError> {
        self.record_one(self.source.get_hypercube(request))
    }
}
