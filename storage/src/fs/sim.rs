//! A simulated removable volume, used to exercise loaders on the host.
//!
//! The [`Volume`] is an explicit fixture owned by the test (or testbench) that sets it up.
//! A [`SimBackend`] borrows it for the duration of a load, so the file map
//! cannot change while a file is open.

use super::{FileError, FileHandle, FileResult, Path, PathBuf, StorageBackend};
use alloc::vec::Vec;
use hashbrown::HashMap;

#[derive(Default, Debug, Clone)]
/// Named files plus injectable failure modes.
pub struct Volume {
    files: HashMap<PathBuf, Vec<u8>>,
    mount_fails: bool,
    read_fails: bool,
}

impl Volume {
    #[must_use]
    #[inline]
    /// Creates an empty volume on which every operation succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    /// Adds a file, replacing any previous file with the same name.
    pub fn insert(&mut self, name: &str, contents: impl Into<Vec<u8>>) {
        self.files.insert(PathBuf::new(name), contents.into());
    }

    #[inline]
    /// Removes a file, returning its contents.
    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        self.files.remove(name)
    }

    #[must_use]
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    #[must_use]
    #[inline]
    pub fn file_size(&self, name: &str) -> Option<usize> {
        self.files.get(name).map(Vec::len)
    }

    #[must_use]
    #[inline]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    #[inline]
    /// Removes every file, leaving the failure flags alone.
    pub fn clear(&mut self) {
        self.files.clear();
    }

    #[inline]
    /// Brings the volume back to its initial state.
    pub fn reset(&mut self) {
        self.clear();
        self.mount_fails = false;
        self.read_fails = false;
    }

    #[inline]
    /// Makes every subsequent `mount` fail with [`FileError::DiskError`].
    pub const fn set_mount_failure(&mut self, fail: bool) {
        self.mount_fails = fail;
    }

    #[inline]
    /// Makes every subsequent `read` fail with [`FileError::InternalError`].
    pub const fn set_read_failure(&mut self, fail: bool) {
        self.read_fails = fail;
    }

    #[must_use]
    #[inline]
    pub fn backend(&self) -> SimBackend<'_> {
        SimBackend {
            volume: self,
            open_files: HashMap::new(),
        }
    }
}

/// Where a handle issued by a [`SimBackend`] is expected to be.
struct OpenFileInfo {
    path: PathBuf,
    cursor: usize,
}

/// A [`StorageBackend`] over a borrowed [`Volume`].
///
/// Only handles returned by this backend's `open`, and not yet closed, can be read from.
pub struct SimBackend<'v> {
    volume: &'v Volume,
    open_files: HashMap<u64, OpenFileInfo>,
}

impl SimBackend<'_> {
    #[must_use]
    #[inline]
    /// Returns how many handles are currently open on this backend.
    pub fn open_count(&self) -> usize {
        self.open_files.len()
    }

    /// Checks that the handle was issued by this backend and has not been tampered with.
    fn validate(&self, file: &FileHandle) -> FileResult<()> {
        let open_file = self
            .open_files
            .get(&file.id())
            .ok_or(FileError::InternalError)?;
        (open_file.path.as_path() == file.path() && open_file.cursor == file.cursor())
            .then_some(())
            .ok_or(FileError::InternalError)
    }
}

impl StorageBackend for SimBackend<'_> {
    fn mount(&mut self) -> FileResult<()> {
        if self.volume.mount_fails {
            log::debug!("sim: mount refused");
            return Err(FileError::DiskError);
        }
        Ok(())
    }

    fn open(&mut self, path: Path) -> FileResult<FileHandle> {
        if !self.volume.files.contains_key(path.as_str()) {
            log::debug!("sim: no file named {path}");
            return Err(FileError::NotFound);
        }
        let handle = FileHandle::new(path);
        self.open_files.insert(
            handle.id(),
            OpenFileInfo {
                path: path.to_owned(),
                cursor: 0,
            },
        );
        Ok(handle)
    }

    fn read(&mut self, file: &mut FileHandle, buffer: &mut [u8]) -> FileResult<usize> {
        if self.validate(file).is_err() {
            log::debug!("sim: read with a handle to {} not issued here", file.path());
            return Err(FileError::InternalError);
        }
        let Some(data) = self.volume.files.get(file.path().as_str()) else {
            return Err(FileError::InternalError);
        };
        if self.volume.read_fails {
            log::debug!("sim: read of {} refused", file.path());
            return Err(FileError::InternalError);
        }

        let start = file.cursor().min(data.len());
        let read_bytes = (data.len() - start).min(buffer.len());

        buffer[..read_bytes].copy_from_slice(&data[start..start + read_bytes]);
        file.advance(read_bytes);
        if let Some(open_file) = self.open_files.get_mut(&file.id()) {
            open_file.cursor = file.cursor();
        }

        log::trace!(
            "sim: read {read_bytes} bytes of {} at offset {start}",
            file.path()
        );
        Ok(read_bytes)
    }

    #[inline]
    fn close(&mut self, file: FileHandle) {
        if self.open_files.remove(&file.id()).is_none() {
            log::debug!("sim: closing a handle to {} not issued here", file.path());
        }
        log::trace!("sim: closed {}", file.path());
    }
}
