//! Loads fixed-size raw images from a removable volume.
//!
//! The [`ImageLoader`] drives any [`StorageBackend`] through a single
//! open, read, close sequence per request and reduces the backend's result codes
//! to success or a [`LoadError`] naming the step that failed.
#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_op_in_unsafe_fn)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

extern crate alloc;

use storage::{FileError, Path, StorageBackend};
use thiserror::Error;

pub mod image;

pub use image::{ImageBuffer, ImageSpec};

#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum LoadError {
    #[error("Mount failed: {0}")]
    Mount(#[source] FileError),
    #[error("Open failed: {0}")]
    Open(#[source] FileError),
    #[error("Read failed: {0}")]
    Read(#[source] FileError),
}

impl LoadError {
    #[must_use]
    #[inline]
    /// Returns the backend error behind this failure.
    pub const fn file_error(&self) -> FileError {
        match self {
            Self::Mount(err) | Self::Open(err) | Self::Read(err) => *err,
        }
    }
}

pub type LoadResult<T> = Result<T, LoadError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Label of the volume, only used in log messages.
    pub drive: &'static str,
    /// Geometry of the images this loader is expected to produce.
    pub image: ImageSpec,
}

impl LoaderConfig {
    pub const DEFAULT_DRIVE: &'static str = "0:/";
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            drive: Self::DEFAULT_DRIVE,
            image: ImageSpec::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Outcome of a successful load into an [`ImageBuffer`].
pub struct LoadReport {
    transferred: usize,
    capacity: usize,
    expected: usize,
}

impl LoadReport {
    #[must_use]
    #[inline]
    pub const fn transferred(&self) -> usize {
        self.transferred
    }

    #[must_use]
    #[inline]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    #[inline]
    /// Returns the size of one image of the configured geometry.
    pub const fn expected(&self) -> usize {
        self.expected
    }

    #[must_use]
    #[inline]
    /// Returns `true` if exactly one image of the configured geometry was loaded.
    pub const fn is_complete(&self) -> bool {
        self.transferred == self.expected
    }
}

pub struct ImageLoader<B: StorageBackend> {
    backend: B,
    config: LoaderConfig,
}

impl<B: StorageBackend> ImageLoader<B> {
    #[must_use]
    #[inline]
    pub fn new(backend: B) -> Self {
        Self::with_config(backend, LoaderConfig::default())
    }

    #[must_use]
    #[inline]
    pub const fn with_config(backend: B, config: LoaderConfig) -> Self {
        Self { backend, config }
    }

    #[must_use]
    #[inline]
    pub const fn config(&self) -> &LoaderConfig {
        &self.config
    }

    #[must_use]
    #[inline]
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Mounts the volume.
    ///
    /// This is meant to be called once, at startup. It is not retried.
    pub fn mount_volume(&mut self) -> LoadResult<()> {
        log::info!("Mounting {}...", self.config.drive);
        self.backend.mount().map_err(|err| {
            log::error!("Mount of {} failed: {err}", self.config.drive);
            LoadError::Mount(err)
        })?;
        log::info!("{} mounted", self.config.drive);
        Ok(())
    }

    /// Fills `destination` from the start of the named file, up to its length.
    ///
    /// Returns how many bytes were transferred. A file shorter than the destination
    /// is still a success: callers that need a full buffer must compare the count
    /// themselves. Bytes past the returned count are left untouched.
    ///
    /// The file is always closed before returning, and on failure the destination
    /// is left exactly as it was.
    pub fn load_file(&mut self, name: &str, destination: &mut [u8]) -> LoadResult<usize> {
        log::info!("Opening {name}...");
        let mut file = self.backend.open(Path::new(name)).map_err(|err| {
            log::error!("Open of {name} failed: {err}");
            LoadError::Open(err)
        })?;

        let res = self.backend.read(&mut file, destination);
        self.backend.close(file);

        let transferred = res.map_err(|err| {
            log::error!("Read of {name} failed: {err}");
            LoadError::Read(err)
        })?;

        log::info!("Read {transferred} bytes from {name}");
        Ok(transferred)
    }

    /// Loads the named file into an image buffer.
    ///
    /// See [`Self::load_file`]. The report is complete when exactly one image of the
    /// configured [`ImageSpec`] was transferred. An incomplete image is logged but
    /// still returned as `Ok`.
    pub fn load_image(&mut self, name: &str, buffer: &mut ImageBuffer) -> LoadResult<LoadReport> {
        let expected = self.config.image.size();
        if buffer.capacity() < expected {
            log::warn!(
                "{name}: buffer of {} bytes cannot hold a {expected} byte image",
                buffer.capacity()
            );
        }

        let transferred = self.load_file(name, buffer)?;
        let report = LoadReport {
            transferred,
            capacity: buffer.capacity(),
            expected,
        };
        if !report.is_complete() {
            log::warn!("{name}: {transferred} of {expected} bytes loaded");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::{FileHandle, FileResult};

    #[derive(Default)]
    /// Records the calls the loader makes.
    struct Recorder {
        calls: Vec<&'static str>,
        open_error: Option<FileError>,
        read_error: Option<FileError>,
        open_files: usize,
    }

    impl StorageBackend for Recorder {
        fn mount(&mut self) -> FileResult<()> {
            self.calls.push("mount");
            Ok(())
        }

        fn open(&mut self, path: Path) -> FileResult<FileHandle> {
            self.calls.push("open");
            if let Some(err) = self.open_error {
                return Err(err);
            }
            self.open_files += 1;
            Ok(FileHandle::new(path))
        }

        fn read(&mut self, file: &mut FileHandle, buffer: &mut [u8]) -> FileResult<usize> {
            self.calls.push("read");
            if let Some(err) = self.read_error {
                return Err(err);
            }
            let n = buffer.len().min(3);
            buffer[..n].fill(0x11);
            file.advance(n);
            Ok(n)
        }

        fn close(&mut self, _file: FileHandle) {
            self.calls.push("close");
            self.open_files -= 1;
        }
    }

    #[test]
    fn test_load_sequence() {
        let mut loader = ImageLoader::new(Recorder::default());
        let mut buffer = [0; 8];
        assert_eq!(loader.load_file("a", &mut buffer), Ok(3));

        let backend = loader.into_backend();
        assert_eq!(backend.calls, ["open", "read", "close"]);
        assert_eq!(backend.open_files, 0);
    }

    #[test]
    fn test_open_failure_skips_read() {
        let mut loader = ImageLoader::new(Recorder {
            open_error: Some(FileError::NotFound),
            ..Recorder::default()
        });
        let mut buffer = [0xAA; 8];
        assert_eq!(
            loader.load_file("a", &mut buffer),
            Err(LoadError::Open(FileError::NotFound))
        );
        assert_eq!(buffer, [0xAA; 8]);
        assert_eq!(loader.into_backend().calls, ["open"]);
    }

    #[test]
    fn test_read_failure_still_closes() {
        let mut loader = ImageLoader::new(Recorder {
            read_error: Some(FileError::InternalError),
            ..Recorder::default()
        });
        let mut buffer = [0xAA; 8];
        let err = loader.load_file("a", &mut buffer).unwrap_err();
        assert_eq!(err, LoadError::Read(FileError::InternalError));
        assert_eq!(err.file_error(), FileError::InternalError);

        let backend = loader.into_backend();
        assert_eq!(backend.calls, ["open", "read", "close"]);
        assert_eq!(backend.open_files, 0);
    }

    #[test]
    fn test_mount_is_not_retried() {
        let mut loader = ImageLoader::new(Recorder::default());
        assert_eq!(loader.mount_volume(), Ok(()));
        assert_eq!(loader.into_backend().calls, ["mount"]);
    }

    #[test]
    fn test_error_labels() {
        assert_eq!(
            LoadError::Read(FileError::InternalError).to_string(),
            "Read failed: Internal error"
        );
        assert_eq!(
            LoadError::Open(FileError::NotFound).to_string(),
            "Open failed: File not found"
        );
        assert_eq!(
            LoadError::Mount(FileError::DiskError).to_string(),
            "Mount failed: Disk error"
        );
    }

    #[test]
    fn test_report() {
        let mut loader = ImageLoader::with_config(
            Recorder::default(),
            LoaderConfig {
                image: ImageSpec::new(2, 1, 1),
                ..LoaderConfig::default()
            },
        );
        let mut buffer = ImageBuffer::new(ImageSpec::new(2, 1, 1));
        let report = loader.load_image("a", &mut buffer).unwrap();
        assert_eq!(report.transferred(), 2);
        assert_eq!(report.expected(), 2);
        assert!(report.is_complete());

        let mut buffer = ImageBuffer::new(ImageSpec::new(4, 1, 1));
        let report = loader.load_image("a", &mut buffer).unwrap();
        assert_eq!(report.transferred(), 3);
        assert_eq!(report.capacity(), 4);
        assert_eq!(report.expected(), 2);
        assert!(!report.is_complete());
        assert_eq!(&buffer[..], &[0x11, 0x11, 0x11, 0]);
    }

    #[test]
    fn test_report_uses_configured_geometry() {
        let mut loader = ImageLoader::with_config(
            Recorder::default(),
            LoaderConfig {
                image: ImageSpec::new(3, 1, 1),
                ..LoaderConfig::default()
            },
        );

        // A larger buffer that holds exactly one configured image is complete.
        let mut buffer = ImageBuffer::new(ImageSpec::new(8, 1, 1));
        let report = loader.load_image("a", &mut buffer).unwrap();
        assert_eq!(report.transferred(), 3);
        assert_eq!(report.capacity(), 8);
        assert!(report.is_complete());

        // A buffer too small for the configured image never is.
        let mut buffer = ImageBuffer::new(ImageSpec::new(2, 1, 1));
        let report = loader.load_image("a", &mut buffer).unwrap();
        assert_eq!(report.transferred(), 2);
        assert!(!report.is_complete());
    }
}
