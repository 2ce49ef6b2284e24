//! Uploaded file descriptors and the storage they are written to.
//!
//! Multipart parsing never touches the disk itself: it yields the bytes of each
//! file part, and the [`UploadStorage`] handed to the codec decides where they go.
//! The resulting [`UploadedFile`] is owned by the decoded request. Its temp file
//! lives until the application moves it with [`UploadedFile::move_to`] or the
//! descriptor is dropped.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tracing::{debug, trace};

use crate::protocol::UploadError;

/// Prefix of every temp file created by [`TempFileStorage`].
pub const UPLOAD_FILE_PREFIX: &str = "rush_upload_";

/// Outcome of writing an uploaded part to temporary storage.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    /// The part was written in full.
    Ok,
    /// The temp file could not be created or written.
    CantWrite,
}

impl UploadStatus {
    #[inline]
    pub fn is_ok(self) -> bool {
        matches!(self, UploadStatus::Ok)
    }
}

/// Capability that allocates storage for uploaded file parts.
pub trait UploadStorage: Send + Sync + fmt::Debug {
    /// Persists `data` and returns the location it can be read back from.
    fn store(&self, data: &[u8]) -> io::Result<PathBuf>;
}

/// Stores uploads as uniquely named files inside a directory.
#[derive(Debug, Clone)]
pub struct TempFileStorage {
    dir: PathBuf,
    prefix: String,
}

impl TempFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), prefix: UPLOAD_FILE_PREFIX.to_string() }
    }

    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Default for TempFileStorage {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl UploadStorage for TempFileStorage {
    fn store(&self, data: &[u8]) -> io::Result<PathBuf> {
        let mut file = tempfile::Builder::new().prefix(&self.prefix).tempfile_in(&self.dir)?;
        file.write_all(data)?;
        file.flush()?;
        let (_file, path) = file.keep().map_err(|e| e.error)?;
        trace!(path = %path.display(), size = data.len(), "stored uploaded part");
        Ok(path)
    }
}

/// Descriptor of one uploaded file from a `multipart/form-data` body.
#[derive(Debug)]
pub struct UploadedFile {
    tmp_path: Option<PathBuf>,
    client_filename: String,
    client_media_type: String,
    size: usize,
    status: UploadStatus,
    moved: bool,
}

impl UploadedFile {
    /// A descriptor whose bytes were written to `tmp_path`.
    pub fn stored(tmp_path: PathBuf, client_filename: String, client_media_type: String, size: usize) -> Self {
        Self { tmp_path: Some(tmp_path), client_filename, client_media_type, size, status: UploadStatus::Ok, moved: false }
    }

    /// A descriptor for a part whose bytes could not be written anywhere.
    pub fn unwritten(client_filename: String, client_media_type: String, size: usize) -> Self {
        Self { tmp_path: None, client_filename, client_media_type, size, status: UploadStatus::CantWrite, moved: false }
    }

    pub fn client_filename(&self) -> &str {
        &self.client_filename
    }

    pub fn client_media_type(&self) -> &str {
        &self.client_media_type
    }

    /// Declared size, the byte length of the part value.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    pub fn tmp_path(&self) -> Option<&Path> {
        self.tmp_path.as_deref()
    }

    pub fn is_moved(&self) -> bool {
        self.moved
    }

    /// Opens a fresh read stream positioned at the start of the temp file.
    pub fn open(&self) -> Result<File, UploadError> {
        let path = self.readable_path()?;
        Ok(File::open(path)?)
    }

    pub fn read_to_bytes(&self) -> Result<Bytes, UploadError> {
        let path = self.readable_path()?;
        Ok(Bytes::from(fs::read(path)?))
    }

    /// Moves the temp file to `target`, creating missing parent directories.
    pub fn move_to(&mut self, target: impl AsRef<Path>) -> Result<(), UploadError> {
        let tmp_path = self.readable_path()?;
        let target = target.as_ref();

        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        if let Err(e) = fs::rename(tmp_path, target) {
            // rename can't cross filesystems
            debug!(cause = %e, "rename uploaded file failed, fall back to copy");
            fs::copy(tmp_path, target)?;
            fs::remove_file(tmp_path)?;
        }

        self.moved = true;
        Ok(())
    }

    fn readable_path(&self) -> Result<&Path, UploadError> {
        if self.moved {
            return Err(UploadError::AlreadyMoved);
        }
        self.tmp_path.as_deref().ok_or(UploadError::Unavailable)
    }
}

impl Drop for UploadedFile {
    fn drop(&mut self) {
        if self.moved {
            return;
        }
        if let Some(path) = &self.tmp_path {
            match fs::remove_file(path) {
                Ok(()) => trace!(path = %path.display(), "removed unclaimed upload"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => debug!(path = %path.display(), cause = %e, "can't remove unclaimed upload"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn temp_storage_writes_prefixed_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TempFileStorage::new(dir.path());

        let path = storage.store(b"hello").unwrap();

        assert!(path.starts_with(dir.path()));
        assert!(path.file_name().unwrap().to_str().unwrap().starts_with(UPLOAD_FILE_PREFIX));
        assert_eq!(fs::read(&path).unwrap(), b"hello");
    }

    #[test]
    fn temp_storage_fails_on_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = TempFileStorage::new(dir.path().join("missing"));

        assert!(storage.store(b"hello").is_err());
    }

    #[test]
    fn open_reads_from_start() {
        let dir = tempfile::tempdir().unwrap();
        let path = TempFileStorage::new(dir.path()).store(b"abc").unwrap();
        let file = UploadedFile::stored(path, "a.txt".into(), "text/plain".into(), 3);

        let mut content = String::new();
        file.open().unwrap().read_to_string(&mut content).unwrap();
        assert_eq!(content, "abc");

        // a second stream starts over
        assert_eq!(file.read_to_bytes().unwrap(), Bytes::from_static(b"abc"));
    }

    #[test]
    fn move_to_creates_parent_and_only_once() {
        let dir = tempfile::tempdir().unwrap();
        let tmp_path = TempFileStorage::new(dir.path()).store(b"payload").unwrap();
        let mut file = UploadedFile::stored(tmp_path.clone(), "p.bin".into(), "application/octet-stream".into(), 7);

        let target = dir.path().join("nested/dir/p.bin");
        file.move_to(&target).unwrap();

        assert!(file.is_moved());
        assert!(!tmp_path.exists());
        assert_eq!(fs::read(&target).unwrap(), b"payload");

        assert!(matches!(file.move_to(dir.path().join("again.bin")), Err(UploadError::AlreadyMoved)));
        assert!(matches!(file.open(), Err(UploadError::AlreadyMoved)));

        drop(file);
        assert!(target.exists());
    }

    #[test]
    fn drop_removes_unclaimed_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let tmp_path = TempFileStorage::new(dir.path()).store(b"x").unwrap();
        let file = UploadedFile::stored(tmp_path.clone(), "x".into(), "text/plain".into(), 1);

        drop(file);
        assert!(!tmp_path.exists());
    }

    #[test]
    fn unwritten_file_is_unavailable() {
        let file = UploadedFile::unwritten("x".into(), "text/plain".into(), 1);

        assert_eq!(file.status(), UploadStatus::CantWrite);
        assert_eq!(file.tmp_path(), None);
        assert!(matches!(file.read_to_bytes(), Err(UploadError::Unavailable)));
    }
}
