use alloc::string::String;
use core::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

pub mod sim;

#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum FileError {
    #[error("Disk error")]
    DiskError,
    #[error("File not found")]
    NotFound,
    #[error("Internal error")]
    InternalError,
}

pub type FileResult<T> = Result<T, FileError>;

/// The four primitives a removable storage volume has to provide.
///
/// On hardware this sits on top of the SD/SPI driver, on the host it is backed by
/// a [`sim::Volume`].
/// Every failure is reported as a [`FileError`] value; none of these operations retries.
///
/// # Notes
///
/// A [`FileHandle`] is only obtained through `open` and is consumed by `close`,
/// so reading from a closed file does not type-check.
pub trait StorageBackend {
    /// Makes the volume available.
    ///
    /// Fails with [`FileError::DiskError`] if the volume cannot be accessed.
    fn mount(&mut self) -> FileResult<()>;
    /// Opens the file with the exact given name, with its cursor at the start.
    ///
    /// Fails with [`FileError::NotFound`] if there is no such file.
    /// This never writes to a caller buffer.
    fn open(&mut self, path: Path) -> FileResult<FileHandle>;
    /// Reads from the file's cursor into the given buffer.
    ///
    /// At most `buffer.len()` bytes are transferred, and never more than remain in the file.
    /// The cursor advances by the returned count, which may be 0 at the end of the file.
    ///
    /// On error, the buffer and the cursor are left as they were.
    fn read(&mut self, file: &mut FileHandle, buffer: &mut [u8]) -> FileResult<usize>;
    /// Closes the file, releasing the handle.
    fn close(&mut self, file: FileHandle);
}

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PathBuf(String);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Path<'a>(&'a str);

impl PathBuf {
    #[must_use]
    #[inline]
    /// Creates a new `PathBuf` from the given string.
    pub fn new(path: &str) -> Self {
        Self(String::from(path))
    }

    #[must_use]
    #[inline]
    pub fn as_path(&self) -> Path<'_> {
        Path(&self.0)
    }
}

impl core::borrow::Borrow<str> for PathBuf {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PathBuf {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'a> Path<'a> {
    #[must_use]
    #[inline]
    /// Creates a new `Path` from the given string slice.
    pub const fn new(path: &'a str) -> Self {
        Self(path)
    }

    #[must_use]
    #[inline]
    pub const fn as_str(&self) -> &'a str {
        self.0
    }
}

impl Path<'_> {
    #[must_use]
    #[inline]
    /// Allocates a new `PathBuf` from the current path.
    pub fn to_owned(&self) -> PathBuf {
        PathBuf::new(self.0)
    }
}

impl<'a> From<&'a str> for Path<'a> {
    #[inline]
    fn from(value: &'a str) -> Self {
        Self(value)
    }
}

impl core::ops::Deref for Path<'_> {
    type Target = str;

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.0
    }
}

impl core::fmt::Display for Path<'_> {
    #[inline]
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.0)
    }
}

static HANDLE_COUNTER: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, PartialEq, Eq)]
/// An open file.
///
/// It is not `Clone`: exactly one owner holds the cursor.
/// Every handle carries an id that is unique for the lifetime of the process,
/// which lets a backend tell the handles it issued from any other.
pub struct FileHandle {
    id: u64,
    path: PathBuf,
    cursor: usize,
}

impl FileHandle {
    #[must_use]
    #[inline]
    /// Creates a handle to the given file, positioned at its first byte.
    ///
    /// Backends call this from `open` once they know the file exists,
    /// and should remember [`Self::id`] to validate later reads.
    pub fn new(path: Path) -> Self {
        Self {
            id: HANDLE_COUNTER.fetch_add(1, Ordering::Relaxed),
            path: path.to_owned(),
            cursor: 0,
        }
    }

    #[must_use]
    #[inline]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    #[inline]
    pub fn path(&self) -> Path<'_> {
        self.path.as_path()
    }

    #[must_use]
    #[inline]
    /// Returns the offset of the next byte to be read.
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    #[inline]
    /// Moves the cursor forward by `count` bytes.
    pub const fn advance(&mut self, count: usize) {
        self.cursor += count;
    }
}
