//! A filesystem pixel source.
//!
//! A pixel file holds the raw samples of a pixel array in XYZCT order with no header.
//! Its [`PixelsDescriptor`] is supplied when opening the file, or read from a JSON sidecar at `<path>.json`.

use std::{
    ffi::OsString,
    fs::File,
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use parking_lot::Mutex;

use crate::{
    byte_range::{validate_byte_ranges, ByteRange},
    hypercube::HypercubeRequest,
    pixels::PixelsDescriptor,
};

use super::{
    DirectHypercubeSourceTraits, PixelsGeometryTraits, RowHypercubeSourceTraits, SourceError,
};

/// A synchronous filesystem pixel source.
///
/// Implements both [`RowHypercubeSourceTraits`] and [`DirectHypercubeSourceTraits`].
/// Hypercubes are retrieved by reading each selected row in full and sampling it along X.
#[derive(Debug)]
pub struct FilesystemPixelsSource {
    path: PathBuf,
    descriptor: PixelsDescriptor,
    file: Mutex<Option<File>>,
}

impl FilesystemPixelsSource {
    /// Open the pixel file at `path` described by `descriptor`.
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the size of `descriptor` overflows, the file cannot be opened, or its size does not match the total size of `descriptor`.
    pub fn open<P: AsRef<Path>>(
        path: P,
        descriptor: PixelsDescriptor,
    ) -> Result<Self, SourceError> {
        descriptor.validate()?;
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path)?;
        let len = file.metadata()?.len();
        if len != descriptor.total_size() {
            return Err(SourceError::SizeMismatch(len, descriptor.total_size()));
        }
        Ok(Self {
            path,
            descriptor,
            file: Mutex::new(Some(file)),
        })
    }

    /// Open the pixel file at `path`, reading its descriptor from the sidecar at `<path>.json`.
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the sidecar is missing or invalid, or the pixel file cannot be opened.
    pub fn open_with_sidecar<P: AsRef<Path>>(path: P) -> Result<Self, SourceError> {
        let sidecar = std::fs::read(Self::sidecar_path(path.as_ref()))?;
        let descriptor: PixelsDescriptor = serde_json::from_slice(&sidecar)?;
        Self::open(path, descriptor)
    }

    /// Write `data` to a new pixel file at `path` with a sidecar for `descriptor`, then open it.
    ///
    /// # Errors
    /// Returns a [`SourceError`] if the length of `data` does not match `descriptor` or the files cannot be written.
    pub fn create<P: AsRef<Path>>(
        path: P,
        descriptor: PixelsDescriptor,
        data: &[u8],
    ) -> Result<Self, SourceError> {
        descriptor.validate()?;
        let path = path.as_ref();
        if data.len() as u64 != descriptor.total_size() {
            return Err(SourceError::SizeMismatch(
                data.len() as u64,
                descriptor.total_size(),
            ));
        }
        let mut file = File::create(path)?;
        file.write_all(data)?;
        file.sync_all()?;
        std::fs::write(
            Self::sidecar_path(path),
            serde_json::to_vec_pretty(&descriptor)?,
        )?;
        Self::open(path, descriptor)
    }

    /// Return the sidecar path of the pixel file at `path`.
    #[must_use]
    pub fn sidecar_path(path: &Path) -> PathBuf {
        let mut sidecar: OsString = path.as_os_str().to_owned();
        sidecar.push(".json");
        PathBuf::from(sidecar)
    }

    /// Return the path of the pixel file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the source has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.file.lock().is_none()
    }

    fn read_region(file: &mut File, byte_range: ByteRange) -> Result<Vec<u8>, SourceError> {
        file.seek(SeekFrom::Start(byte_range.start()))?;
        let length = usize::try_from(byte_range.length())
            .map_err(|_| SourceError::Other(format!("byte range {byte_range} is too large")))?;
        let mut buffer = vec![0; length];
        file.read_exact(&mut buffer)?;
        Ok(buffer)
    }
}

impl PixelsGeometryTraits for FilesystemPixelsSource {
    fn descriptor(&self) -> Result<PixelsDescriptor, SourceError> {
        if self.is_closed() {
            Err(SourceError::Closed)
        } else {
            Ok(self.descriptor)
        }
    }

    fn close(&self) -> Result<(), SourceError> {
        self.file.lock().take();
        Ok(())
    }
}

impl RowHypercubeSourceTraits for FilesystemPixelsSource {
    fn get_region(&self, byte_range: ByteRange) -> Result<Vec<u8>, SourceError> {
        let mut file = self.file.lock();
        let file = file.as_mut().ok_or(SourceError::Closed)?;
        validate_byte_ranges(&[byte_range], self.descriptor.total_size())?;
        Self::read_region(file, byte_range)
    }

    fn get_regions(&self, byte_ranges: &[ByteRange]) -> Result<Vec<Vec<u8>>, SourceError> {
        let mut file = self.file.lock();
        let file = file.as_mut().ok_or(SourceError::Closed)?;
        validate_byte_ranges(byte_ranges, self.descriptor.total_size())?;
        byte_ranges
            .iter()
            .map(|byte_range| Self::read_region(file, *byte_range))
            .collect()
    }
}

impl DirectHypercubeSourceTraits for FilesystemPixelsSource {
    fn get_hypercube(&self, request: &HypercubeRequest) -> Result<Vec<u8>, SourceError> {
        let mut file = self.file.lock();
        let file = file.as_mut().ok_or(SourceError::Closed)?;
        request.validate(&self.descriptor.dimensions)?;

        let byte_width = usize::try_from(self.descriptor.byte_width()).unwrap_or_default();
        let row_size = self.descriptor.row_size();
        let mut out = Vec::with_capacity(request.iter_indices().len() * byte_width);
        for row in request.iter_rows() {
            let offset = self.descriptor.row_offset(row.y, row.z, row.c, row.t)?;
            let row_bytes = Self::read_region(file, ByteRange::new(offset, row_size))?;
            for sample in row_bytes
                .chunks_exact(byte_width)
                .skip(usize::try_from(request.start()[0]).unwrap_or(usize::MAX))
                .take(usize::try_from(request.size()[0]).unwrap_or(usize::MAX))
                .step_by(usize::try_from(request.step()[0]).unwrap_or(usize::MAX))
            {
                out.extend_from_slice(sample);
            }
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
    #[cfg_attr(miri, ignore)]
    fn filesystem_source() -> Result<(), Box<dyn std::error::Error>> {
        let path = tempfile::TempDir::new()?;
        let (descriptor, data) =
            source_test::ramp(PixelsDimensions::new(7, 5, 3, 2, 3), PixelType::Float);
        let source = FilesystemPixelsSource::create(path.path().join("ramp.raw"), descriptor, &data)?;
        source_test::source_read(&source)?;
        source_test::source_hypercube(&source)?;
        source_test::source_close(&source)?;
        assert!(source.is_closed());
        Ok(())
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn filesystem_source_sidecar() -> Result<(), Box<dyn std::error::Error>> {
        let path = tempfile::TempDir::new()?;
        let pixels_path = path.path().join("tiny.raw");
        let (descriptor, data) =
            source_test::ramp(PixelsDimensions::new(4, 4, 1, 1, 1), PixelType::Int16);
        FilesystemPixelsSource::create(&pixels_path, descriptor, &data)?.close()?;
        assert!(path.path().join("tiny.raw.json").exists());

        let source = FilesystemPixelsSource::open_with_sidecar(&pixels_path)?;
        assert_eq!(source.descriptor()?, descriptor);
        assert_eq!(source.path(), pixels_path);

        std::fs::write(FilesystemPixelsSource::sidecar_path(&pixels_path), b"{}")?;
        assert!(matches!(
            FilesystemPixelsSource::open_with_sidecar(&pixels_path),
            Err(SourceError::InvalidDescriptor(_))
        ));
        Ok(())
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn filesystem_source_size_mismatch() -> Result<(), Box<dyn std::error::Error>> {
        let path = tempfile::TempDir::new()?;
        let pixels_path = path.path().join("short.raw");
        std::fs::write(&pixels_path, [0u8; 7])?;
        let descriptor =
            PixelsDescriptor::new(PixelsDimensions::new(2, 2, 1, 1, 1), PixelType::Uint16);
        assert!(matches!(
            FilesystemPixelsSource::open(&pixels_path, descriptor),
            Err(SourceError::SizeMismatch(7, 8))
        ));
        assert!(matches!(
            FilesystemPixelsSource::open(path.path().join("missing.raw"), descriptor),
            Err(SourceError::IOError(_))
        ));
        Ok(())
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn filesystem_source_oversized_descriptor() -> Result<(), Box<dyn std::error::Error>> {
        let path = tempfile::TempDir::new()?;
        let pixels_path = path.path().join("huge.raw");
        std::fs::write(&pixels_path, [0u8; 4])?;
        std::fs::write(
            FilesystemPixelsSource::sidecar_path(&pixels_path),
            br#"{"pixel_type":"uint32","size_x":4294967296,"size_y":4294967296,"size_z":1,"size_c":1,"size_t":1}"#,
        )?;
        assert!(matches!(
            FilesystemPixelsSource::open_with_sidecar(&pixels_path),
            Err(SourceError::InvalidSize(_))
        ));

        let descriptor = PixelsDescriptor::new(
            PixelsDimensions::new(1 << 32, 1 << 32, 1, 1, 1),
            PixelType::Uint32,
        );
        assert!(matches!(
            FilesystemPixelsSource::create(path.path().join("new.raw"), descriptor, &[0u8; 4]),
            Err(SourceError::InvalidSize(_))
        ));
        assert!(!path.path().join("new.raw").exists());
        Ok(())
    }
}
