//! A pixel source adapter which prints function calls.

use std::{
    io::Write,
    sync::{Arc, Mutex, PoisonError},
};

use itertools::Itertools;

use crate::{
    byte_range::ByteRange,
    hypercube::HypercubeRequest,
    pixels::PixelsDescriptor,
    source::{
        DirectHypercubeSourceTraits, PixelsGeometryTraits, RowHypercubeSourceTraits, SourceError,
    },
};

/// The usage log source adapter. Logs pixel source method calls.
///
/// It is intended to aid in debugging by revealing the access pattern of a comparison.
///
/// ### Example (log to stdout)
/// ```rust
/// # use std::sync::{Arc, Mutex};
/// # use pixelcube::pixels::{PixelType, PixelsDescriptor, PixelsDimensions};
/// # use pixelcube::source::{MemoryPixelsSource, source_adapter::usage_log::UsageLogSourceAdapter};
/// let descriptor = PixelsDescriptor::new(PixelsDimensions::new(2, 2, 1, 1, 1), PixelType::Uint8);
/// let source = Arc::new(MemoryPixelsSource::new(descriptor, vec![0; 4])?);
/// let log_writer = Arc::new(Mutex::new(
///     // std::io::BufWriter::new(
///     std::io::stdout(),
///     //    )
/// ));
/// let source = Arc::new(UsageLogSourceAdapter::new(source, log_writer, || {
///     chrono::Utc::now().format("[%T%.3f] ").to_string()
/// }));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// Reconstructing a hypercube through the above [`UsageLogSourceAdapter`] prints outputs like:
/// ```text
/// [09:12:40.311] descriptor() -> Ok(PixelsDescriptor { pixel_type: Uint16, dimensions: ... })
/// [09:12:40.311] byte_width() -> Ok(2)
/// [09:12:40.311] row_offset(3, 0, 0, 0) -> Ok(60)
/// [09:12:40.311] get_region(66..74) -> len=Ok(8)
/// [09:12:40.312] get_regions([6..14, 26..34]) -> len=Ok([8, 8])
/// [09:12:40.312] get_hypercube(start [3, 3, 0, 0, 0] size [4, 4, 1, 1, 1] step [1, 1, 1, 1, 1]) -> len=Ok(32)
/// [09:12:40.313] close() -> Ok(())
/// ```
pub struct UsageLogSourceAdapter<TSource: ?Sized> {
    source: Arc<TSource>,
    handle: Arc<Mutex<dyn Write + Send + Sync>>,
    prefix_func: fn() -> String,
}

impl<TSource: ?Sized> core::fmt::Debug for UsageLogSourceAdapter<TSource> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        writeln!(f, "usage log")
    }
}

impl<TSource: ?Sized> UsageLogSourceAdapter<TSource> {
    /// Create a new usage log source adapter.
    pub fn new(
        source: Arc<TSource>,
        handle: Arc<Mutex<dyn Write + Send + Sync>>,
        prefix_func: fn() -> String,
    ) -> Self {
        Self {
            source,
            handle,
            prefix_func,
        }
    }

    fn log(&self, args: std::fmt::Arguments) -> Result<(), SourceError> {
        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(handle, "{}{args}", (self.prefix_func)())?;
        Ok(())
    }
}

impl<TSource: ?Sized + PixelsGeometryTraits> PixelsGeometryTraits
    for UsageLogSourceAdapter<TSource>
{
    fn descriptor(&self) -> Result<PixelsDescriptor, SourceError> {
        let result = self.source.descriptor();
        self.log(format_args!("descriptor() -> {result:?}"))?;
        result
    }

    fn byte_width(&self) -> Result<u64, SourceError> {
        let result = self.source.byte_width();
        self.log(format_args!("byte_width() -> {result:?}"))?;
        result
    }

    fn row_offset(&self, y: u64, z: u64, c: u64, t: u64) -> Result<u64, SourceError> {
        let result = self.source.row_offset(y, z, c, t);
        self.log(format_args!("row_offset({y}, {z}, {c}, {t}) -> {result:?}"))?;
        result
    }

    fn plane_offset(&self, z: u64, c: u64, t: u64) -> Result<u64, SourceError> {
        let result = self.source.plane_offset(z, c, t);
        self.log(format_args!("plane_offset({z}, {c}, {t}) -> {result:?}"))?;
        result
    }

    fn stack_offset(&self, c: u64, t: u64) -> Result<u64, SourceError> {
        let result = self.source.stack_offset(c, t);
        self.log(format_args!("stack_offset({c}, {t}) -> {result:?}"))?;
        result
    }

    fn timepoint_offset(&self, t: u64) -> Result<u64, SourceError> {
        let result = self.source.timepoint_offset(t);
        self.log(format_args!("timepoint_offset({t}) -> {result:?}"))?;
        result
    }

    fn row_size(&self) -> Result<u64, SourceError> {
        let result = self.source.row_size();
        self.log(format_args!("row_size() -> {result:?}"))?;
        result
    }

    fn col_size(&self) -> Result<u64, SourceError> {
        let result = self.source.col_size();
        self.log(format_args!("col_size() -> {result:?}"))?;
        result
    }

    fn plane_size(&self) -> Result<u64, SourceError> {
        let result = self.source.plane_size();
        self.log(format_args!("plane_size() -> {result:?}"))?;
        result
    }

    fn stack_size(&self) -> Result<u64, SourceError> {
        let result = self.source.stack_size();
        self.log(format_args!("stack_size() -> {result:?}"))?;
        result
    }

    fn timepoint_size(&self) -> Result<u64, SourceError> {
        let result = self.source.timepoint_size();
        self.log(format_args!("timepoint_size() -> {result:?}"))?;
        result
    }

    fn total_size(&self) -> Result<u64, SourceError> {
        let result = self.source.total_size();
        self.log(format_args!("total_size() -> {result:?}"))?;
        result
    }

    fn close(&self) -> Result<(), SourceError> {
        let result = self.source.close();
        self.log(format_args!("close() -> {result:?}"))?;
        result
    }
}

impl<TSource: ?Sized + RowHypercubeSourceTraits> RowHypercubeSourceTraits
    for UsageLogSourceAdapter<TSource>
{
    fn get_region(&self, byte_range: ByteRange) -> Result<Vec<u8>, SourceError> {
        let result = self.source.get_region(byte_range);
        self.log(format_args!(
            "get_region({byte_range}) -> len={:?}",
            result.as_ref().map(Vec::len)
        ))?;
        result
    }

    fn get_regions(&self, byte_ranges: &[ByteRange]) -> Result<Vec<Vec<u8>>, SourceError> {
        let result = self.source.get_regions(byte_ranges);
        self.log(format_args!(
            "get_regions([{}]) -> len={:?}",
            byte_ranges.iter().format(", "),
            result
                .as_ref()
                .map(|regions| regions.iter().map(Vec::len).collect_vec())
        ))?;
        result
    }

    fn get_row(&self, y: u64, z: u64, c: u64, t: u64) -> Result<Vec<u8>, SourceError> {
        let result = RowHypercubeSourceTraits::get_row(&*self.source, y, z, c, t);
        self.log(format_args!(
            "get_row({y}, {z}, {c}, {t}) -> len={:?}",
            result.as_ref().map(Vec::len)
        ))?;
        result
    }

    fn get_col(&self, x: u64, z: u64, c: u64, t: u64) -> Result<Vec<u8>, SourceError> {
        let result = RowHypercubeSourceTraits::get_col(&*self.source, x, z, c, t);
        self.log(format_args!(
            "get_col({x}, {z}, {c}, {t}) -> len={:?}",
            result.as_ref().map(Vec::len)
        ))?;
        result
    }

    fn get_plane(&self, z: u64, c: u64, t: u64) -> Result<Vec<u8>, SourceError> {
        let result = RowHypercubeSourceTraits::get_plane(&*self.source, z, c, t);
        self.log(format_args!(
            "get_plane({z}, {c}, {t}) -> len={:?}",
            result.as_ref().map(Vec::len)
        ))?;
        result
    }

    fn get_stack(&self, c: u64, t: u64) -> Result<Vec<u8>, SourceError> {
        let result = RowHypercubeSourceTraits::get_stack(&*self.source, c, t);
        self.log(format_args!(
            "get_stack({c}, {t}) -> len={:?}",
            result.as_ref().map(Vec::len)
        ))?;
        result
    }

    fn get_timepoint(&self, t: u64) -> Result<Vec<u8>, SourceError> {
        let result = RowHypercubeSourceTraits::get_timepoint(&*self.source, t);
        self.log(format_args!(
            "get_timepoint({t}) -> len={:?}",
            result.as_ref().map(Vec::len)
        ))?;
        result
    }
}

impl<TSource: ?Sized + DirectHypercubeSourceTraits> DirectHypercubeSourceTraits
    for UsageLogSourceAdapter<TSource>
{
    fn get_hypercube(&self, request: &HypercubeRequest) -> Result<Vec<u8>, SourceError> {
        let result = self.source.get_hypercube(request);
        self.log(format_args!(
            "get_hypercube({request}) -> len={:?}",
            result.as_ref().map(Vec::len)
        ))?;
        result
    }

    fn get_row(&self, y: u64, z: u64, c: u64, t: u64) -> Result<Vec<u8>, SourceError> {
        let result = DirectHypercubeSourceTraits::get_row(&*self.source, y, z, c, t);
        self.log(format_args!(
            "get_row({y}, {z}, {c}, {t}) -> len={:?}",
            result.as_ref().map(Vec::len)
        ))?;
        result
    }

    fn get_col(&self, x: u64, z: u64, c: u64, t: u64) -> Result<Vec<u8>, SourceError> {
        let result = DirectHypercubeSourceTraits::get_col(&*self.source, x, z, c, t);
        self.log(format_args!(
            "get_col({x}, {z}, {c}, {t}) -> len={:?}",
            result.as_ref().map(Vec::len)
        ))?;
        result
    }

    fn get_plane(&self, z: u64, c: u64, t: u64) -> Result<Vec<u8>, SourceError> {
        let result = DirectHypercubeSourceTraits::get_plane(&*self.source, z, c, t);
        self.log(format_args!(
            "get_plane({z}, {c}, {t}) -> len={:?}",
            result.as_ref().map(Vec::len)
        ))?;
        result
    }

    fn get_stack(&self, c: u64, t: u64) -> Result<Vec<u8>, SourceError> {
        let result = DirectHypercubeSourceTraits::get_stack(&*self.source, c, t);
        self.log(format_args!(
            "get_stack({c}, {t}) -> len={:?}",
            result.as_ref().map(Vec::len)
        ))?;
        result
    }

    fn get_timepoint(&self, t: u64) -> Result<Vec<u8>, SourceError> {
        let result = DirectHypercubeSourceTraits::get_timepoint(&*self.source, t);
        self.log(format_args!(
            "get_timepoint({t}) -> len={:?}",
            result.as_ref().map(Vec::len)
        ))?;
        result
    }
}
