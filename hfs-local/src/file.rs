// SPDX-License-Identifier: AGPL-3.0-or-later
//! Regular file handle

use hfs_core::{
    mime::mime_type_for_extension,
    path::{self, assert_name, split_extension},
    EntryKind, HfsError, HfsResult, Metadata,
};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::DirHandle;

/// A regular file addressed by path
///
/// Constructing a handle does no I/O and asserts nothing about the file.
/// Metadata is loaded on demand and kept until the next explicit reload, so
/// after a rename, move or removal the cached snapshot is stale.
#[derive(Debug, Clone)]
pub struct FileHandle {
    name: OsString,
    parent: PathBuf,
    cached: Option<Metadata>,
}

impl FileHandle {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let (parent, name) = path::split(path);
        Self { name, parent, cached: None }
    }

    /// Handle whose metadata is already known, e.g. from a directory walk.
    pub(crate) fn with_metadata(path: impl AsRef<Path>, metadata: Metadata) -> Self {
        debug_assert!(metadata.is_regular());
        let mut file = Self::new(path);
        file.cached = Some(metadata);
        file
    }

    /// Final path component, as raw OS text.
    pub fn name(&self) -> &OsStr {
        &self.name
    }

    pub fn path(&self) -> PathBuf {
        path::clean(self.parent.join(&self.name))
    }

    /// Text after the last `.` of the name, empty when there is none.
    pub fn extension(&self) -> &OsStr {
        split_extension(&self.name).1
    }

    /// Name without its extension.
    pub fn bare_name(&self) -> &OsStr {
        split_extension(&self.name).0
    }

    pub fn parent(&self) -> DirHandle {
        DirHandle::new(&self.parent)
    }

    /// Content type derived from the extension, `""` when unknown.
    pub fn mime_type(&self) -> &'static str {
        self.extension().to_str().map_or("", mime_type_for_extension)
    }

    /// Metadata from the last successful load, without touching the disk.
    pub fn cached_metadata(&self) -> Option<&Metadata> {
        self.cached.as_ref()
    }

    fn stat(&self) -> HfsResult<Metadata> {
        let path = self.path();
        let meta = fs::metadata(&path).map_err(|e| HfsError::from_io(&path, e))?;
        let meta = Metadata::from(&meta);
        trace!(path = %path.display(), kind = ?meta.kind, size = meta.size, "loaded file metadata");
        match meta.kind {
            EntryKind::File => Ok(meta),
            EntryKind::Directory => Err(HfsError::IsDirectory(path)),
            EntryKind::Symlink | EntryKind::Unknown => Err(HfsError::IsNotRegular(path)),
        }
    }

    /// Stat the path and replace the cache.
    ///
    /// The cache is cleared on any failure, including a kind mismatch.
    pub fn load_metadata(&mut self) -> HfsResult<()> {
        self.cached = None;
        self.cached = Some(self.stat()?);
        Ok(())
    }

    /// Cached metadata, loading it first if nothing is cached.
    pub fn info(&mut self) -> HfsResult<&Metadata> {
        let meta = match self.cached.take() {
            Some(meta) => meta,
            None => self.stat()?,
        };
        Ok(self.cached.insert(meta))
    }

    /// Reload metadata and report whether the file exists.
    ///
    /// A missing path is `Ok(false)`. A directory at the path is
    /// `Err(HfsError::IsDirectory)`: something exists there, just not a file.
    /// Any other failure means existence could not be established.
    pub fn exists(&mut self) -> HfsResult<bool> {
        match self.load_metadata() {
            Ok(()) => Ok(true),
            Err(HfsError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Open the file for reading and hand it to `consumer`.
    ///
    /// The file is closed when the call returns, whatever the outcome. A
    /// missing file is reported as `NotFound` and is never created.
    pub fn read<T, E, F>(&self, consumer: F) -> Result<T, E>
    where
        F: FnOnce(&mut File) -> Result<T, E>,
        E: From<HfsError>,
    {
        let path = self.path();
        let mut file = File::open(&path).map_err(|e| HfsError::from_io(&path, e))?;
        consumer(&mut file)
    }

    /// Create or truncate the file and hand a writer to `consumer`.
    ///
    /// When the consumer succeeds the writer is flushed and the file synced
    /// before returning. When it fails the file is still closed and the
    /// consumer's error is returned.
    pub fn write<T, E, F>(&self, consumer: F) -> Result<T, E>
    where
        F: FnOnce(&mut BufWriter<File>) -> Result<T, E>,
        E: From<HfsError>,
    {
        let path = self.path();
        let file = File::create(&path).map_err(|e| HfsError::from_io(&path, e))?;
        let mut writer = BufWriter::new(file);
        let value = consumer(&mut writer)?;
        writer.flush().map_err(HfsError::from)?;
        writer.get_ref().sync_all().map_err(HfsError::from)?;
        debug!(path = %path.display(), "wrote file");
        Ok(value)
    }

    /// Copy the contents to `dest`, creating or truncating it.
    ///
    /// Returns the number of bytes copied. If streaming fails part way the
    /// destination keeps whatever was written.
    pub fn copy(&self, dest: impl AsRef<Path>) -> HfsResult<u64> {
        let dest = dest.as_ref();
        let copied = self.read(|src| {
            let mut out = File::create(dest).map_err(|e| HfsError::from_io(dest, e))?;
            let copied = io::copy(src, &mut out)?;
            out.sync_all()?;
            Ok::<_, HfsError>(copied)
        })?;
        debug!(from = %self.path().display(), to = %dest.display(), bytes = copied, "copied file");
        Ok(copied)
    }

    /// Rename the file within its directory.
    ///
    /// On failure the handle keeps its old name and the OS error is returned
    /// as is.
    ///
    /// # Panics
    ///
    /// Panics if `new_name` is not a single path component: it contains a
    /// separator or is empty, `.` or `..`.
    #[track_caller]
    pub fn rename(&mut self, new_name: impl AsRef<OsStr>) -> HfsResult<()> {
        let new_name = new_name.as_ref();
        assert_name(new_name);
        let old_path = self.path();
        let old_name = std::mem::replace(&mut self.name, new_name.to_os_string());
        let new_path = self.path();

        if let Err(err) = fs::rename(&old_path, &new_path) {
            debug!(from = %old_path.display(), to = %new_path.display(), error = %err, "rename failed, keeping old name");
            self.name = old_name;
            return Err(HfsError::Io(err));
        }
        debug!(from = %old_path.display(), to = %new_path.display(), "renamed file");
        Ok(())
    }

    /// Move the file into `new_parent`, keeping its name.
    ///
    /// On failure the handle keeps its old parent and the OS error is returned
    /// as is, so a missing destination is never reported as `NotFound` for
    /// the file itself. Moves across devices fail like any other rename.
    pub fn move_to(&mut self, new_parent: impl AsRef<Path>) -> HfsResult<()> {
        let old_path = self.path();
        let old_parent = std::mem::replace(&mut self.parent, path::clean(new_parent));
        let new_path = self.path();

        if let Err(err) = fs::rename(&old_path, &new_path) {
            debug!(from = %old_path.display(), to = %new_path.display(), error = %err, "move failed, keeping old parent");
            self.parent = old_parent;
            return Err(HfsError::Io(err));
        }
        debug!(from = %old_path.display(), to = %new_path.display(), "moved file");
        Ok(())
    }

    pub fn remove(&self) -> HfsResult<()> {
        let path = self.path();
        fs::remove_file(&path).map_err(|e| HfsError::from_io(&path, e))?;
        debug!(path = %path.display(), "removed file");
        Ok(())
    }

    /// Open the file with caller-chosen options.
    ///
    /// The returned descriptor belongs to the caller.
    pub fn open_with(&self, options: &OpenOptions) -> HfsResult<File> {
        let path = self.path();
        options.open(&path).map_err(|e| HfsError::from_io(&path, e))
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().display())
    }
}
