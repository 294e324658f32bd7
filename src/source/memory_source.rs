//! An in-memory pixel source.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;

use crate::{
    byte_range::{extract_byte_ranges, validate_byte_ranges, ByteOffset, ByteRange},
    hypercube::HypercubeRequest,
    pixels::PixelsDescriptor,
};

use super::{
    DirectHypercubeSourceTraits, PixelsGeometryTraits, RowHypercubeSourceTraits, SourceError,
};

/// An in-memory pixel source.
///
/// Implements both [`RowHypercubeSourceTraits`] and [`DirectHypercubeSourceTraits`].
/// Hypercubes are retrieved by locating every selected sample independently, without reference to row offsets.
#[derive(Debug)]
pub struct MemoryPixelsSource {
    descriptor: PixelsDescriptor,
    data: RwLock<Vec<u8>>,
    closed: AtomicBool,
}

impl MemoryPixelsSource {
    /// Create a new memory pixel source holding `data`.
    ///
    /// # Errors
    /// Returns [`SourceError::InvalidSize`] if the size of `descriptor` overflows, or [`SourceError::SizeMismatch`] if the length of `data` does not match the total size of `descriptor`.
    pub fn new(descriptor: PixelsDescriptor, data: Vec<u8>) -> Result<Self, SourceError> {
        descriptor.validate()?;
        let expected = descriptor.total_size();
        if data.len() as u64 != expected {
            return Err(SourceError::SizeMismatch(data.len() as u64, expected));
        }
        Ok(Self {
            descriptor,
            data: RwLock::new(data),
            closed: AtomicBool::new(false),
        })
    }

    /// Create a new memory pixel source from typed `elements` in XYZCT order.
    ///
    /// Elements are stored in native endianness.
    ///
    /// # Errors
    /// Returns [`SourceError::IncompatibleElementSize`] if the size of `T` does not match the pixel type, or [`SourceError::SizeMismatch`] if the number of elements is incorrect.
    pub fn from_elements<T: bytemuck::Pod>(
        descriptor: PixelsDescriptor,
        elements: &[T],
    ) -> Result<Self, SourceError> {
        let element_size = std::mem::size_of::<T>();
        if element_size as u64 != descriptor.byte_width() {
            return Err(SourceError::IncompatibleElementSize(
                element_size,
                descriptor.byte_width(),
            ));
        }
        Self::new(descriptor, bytemuck::cast_slice(elements).to_vec())
    }

    /// Overwrite the bytes beginning at `offset` with `value`.
    ///
    /// # Errors
    /// Returns [`SourceError::InvalidByteRangeError`] if `value` extends beyond the pixel buffer.
    pub fn store_region(&self, offset: ByteOffset, value: &[u8]) -> Result<(), SourceError> {
        let byte_range = ByteRange::new(offset, value.len() as u64);
        let mut data = self.data.write();
        validate_byte_ranges(&[byte_range], data.len() as u64)?;
        data[byte_range.to_range_usize()?].copy_from_slice(value);
        Ok(())
    }

    /// Returns true if the source has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn check_open(&self) -> Result<(), SourceError> {
        if self.is_closed() {
            Err(SourceError::Closed)
        } else {
            Ok(())
        }
    }
}

impl PixelsGeometryTraits for MemoryPixelsSource {
    fn descriptor(&self) -> Result<PixelsDescriptor, SourceError> {
        self.check_open()?;
        Ok(self.descriptor)
    }

    fn close(&self) -> Result<(), SourceError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

impl RowHypercubeSourceTraits for MemoryPixelsSource {
    fn get_region(&self, byte_range: ByteRange) -> Result<Vec<u8>, SourceError> {
        self.check_open()?;
        let data = self.data.read();
        Ok(extract_byte_ranges(&data, &[byte_range])?.remove(0))
    }

    fn get_regions(&self, byte_ranges: &[ByteRange]) -> Result<Vec<Vec<u8>>, SourceError> {
        self.check_open()?;
        let data = self.data.read();
        Ok(extract_byte_ranges(&data, byte_ranges)?)
    }
}

impl DirectHypercubeSourceTraits for MemoryPixelsSource {
    fn get_hypercube(&self, request: &HypercubeRequest) -> Result<Vec<u8>, SourceError> {
        self.check_open()?;
        request.validate(&self.descriptor.dimensions)?;
        let byte_width = usize::try_from(self.descriptor.byte_width()).unwrap_or_default();
        let data = self.data.read();
        let mut out = Vec::with_capacity(request.iter_indices().len() * byte_width);
        for indices in request.iter_indices() {
            let offset = usize::try_from(self.descriptor.sample_offset(indices)?)
                .map_err(|_| SourceError::Other("sample offset exceeds usize::MAX".to_string()))?;
            out.extend_from_slice(&data[offset..offset + byte_width]);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        pixels::{PixelType, PixelsDimensions},
        source::source_test,
    };

    use super::*;

    #[test]
    fn memory_source() -> Result<(), Box<dyn std::error::Error>> {
        let (descriptor, data) =
            source_test::ramp(PixelsDimensions::new(5, 4, 3, 2, 2), PixelType::Uint16);
        let source = MemoryPixelsSource::new(descriptor, data)?;
        source_test::source_read(&source)?;
        source_test::source_hypercube(&source)?;
        source_test::source_close(&source)?;
        assert!(source.is_closed());
        Ok(())
    }

    #[test]
    fn memory_source_size_mismatch() {
        let descriptor =
            PixelsDescriptor::new(PixelsDimensions::new(2, 2, 1, 1, 1), PixelType::Uint8);
        assert!(matches!(
            MemoryPixelsSource::new(descriptor, vec![0; 3]),
            Err(SourceError::SizeMismatch(3, 4))
        ));

        let descriptor = PixelsDescriptor::new(
            PixelsDimensions::new(1 << 32, 1 << 32, 1, 1, 1),
            PixelType::Uint32,
        );
        assert!(matches!(
            MemoryPixelsSource::new(descriptor, vec![0; 4]),
            Err(SourceError::InvalidSize(_))
        ));
    }

    #[test]
    fn memory_source_from_elements() -> Result<(), Box<dyn std::error::Error>> {
        let descriptor =
            PixelsDescriptor::new(PixelsDimensions::new(2, 2, 1, 1, 1), PixelType::Uint16);
        let source = MemoryPixelsSource::from_elements(descriptor, &[1u16, 2, 3, 4])?;
        assert_eq!(
            RowHypercubeSourceTraits::get_row(&source, 1, 0, 0, 0)?,
            [3u16.to_ne_bytes(), 4u16.to_ne_bytes()].concat()
        );
        assert!(matches!(
            MemoryPixelsSource::from_elements(descriptor, &[1u8, 2, 3, 4]),
            Err(SourceError::IncompatibleElementSize(1, 2))
        ));
        Ok(())
    }

    #[test]
    fn memory_source_store_region() -> Result<(), Box<dyn std::error::Error>> {
        let descriptor =
            PixelsDescriptor::new(PixelsDimensions::new(4, 1, 1, 1, 1), PixelType::Uint8);
        let source = MemoryPixelsSource::new(descriptor, vec![0, 1, 2, 3])?;
        source.store_region(1, &[9, 9])?;
        assert_eq!(source.get_region(ByteRange::new(0, 4))?, vec![0, 9, 9, 3]);
        assert!(source.store_region(3, &[9, 9]).is_err());
        Ok(())
    }
}
