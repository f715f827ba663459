// SPDX-License-Identifier: AGPL-3.0-or-later
//! Directory handle

use hfs_core::{
    path::{self, assert_name},
    Entry, HfsError, HfsResult, ListOptions, Metadata, DIR_MODE,
};
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs::{self, DirBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use crate::FileHandle;

/// A directory addressed by path
///
/// Like [`FileHandle`], construction performs no I/O and metadata is cached
/// until reloaded explicitly.
#[derive(Debug, Clone)]
pub struct DirHandle {
    name: OsString,
    parent: PathBuf,
    cached: Option<Metadata>,
}

impl DirHandle {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let (parent, name) = path::split(path);
        Self { name, parent, cached: None }
    }

    pub(crate) fn with_metadata(path: impl AsRef<Path>, metadata: Metadata) -> Self {
        debug_assert!(metadata.is_dir());
        let mut dir = Self::new(path);
        dir.cached = Some(metadata);
        dir
    }

    pub fn name(&self) -> &OsStr {
        &self.name
    }

    pub fn path(&self) -> PathBuf {
        path::clean(self.parent.join(&self.name))
    }

    pub fn parent(&self) -> DirHandle {
        DirHandle::new(&self.parent)
    }

    /// Ancestor `levels` steps up, resolved lexically.
    pub fn up(&self, levels: usize) -> DirHandle {
        DirHandle::new(path::join(self.path(), std::iter::repeat("..").take(levels)))
    }

    /// This directory's path with `segments` appended and cleaned.
    pub fn join<I, S>(&self, segments: I) -> PathBuf
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        path::join(self.path(), segments)
    }

    pub fn cached_metadata(&self) -> Option<&Metadata> {
        self.cached.as_ref()
    }

    fn stat(&self) -> HfsResult<Metadata> {
        let path = self.path();
        let meta = fs::metadata(&path).map_err(|e| HfsError::from_io(&path, e))?;
        let meta = Metadata::from(&meta);
        trace!(path = %path.display(), kind = ?meta.kind, "loaded directory metadata");
        if meta.is_dir() {
            Ok(meta)
        } else {
            Err(HfsError::IsFile(path))
        }
    }

    /// Stat the path and replace the cache, clearing it on failure.
    pub fn load_metadata(&mut self) -> HfsResult<()> {
        self.cached = None;
        self.cached = Some(self.stat()?);
        Ok(())
    }

    pub fn info(&mut self) -> HfsResult<&Metadata> {
        let meta = match self.cached.take() {
            Some(meta) => meta,
            None => self.stat()?,
        };
        Ok(self.cached.insert(meta))
    }

    /// Reload metadata and report whether the directory exists.
    ///
    /// Anything that is not a directory yields `Err(HfsError::IsFile)`,
    /// which still tells the caller the path is taken.
    pub fn exists(&mut self) -> HfsResult<bool> {
        match self.load_metadata() {
            Ok(()) => Ok(true),
            Err(HfsError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Create this directory only. The parent must exist and this path must
    /// not.
    pub fn create(&self) -> HfsResult<()> {
        let path = self.path();
        dir_builder(false)
            .create(&path)
            .map_err(|e| HfsError::from_io(&path, e))?;
        debug!(path = %path.display(), "created directory");
        Ok(())
    }

    /// Create this directory and any missing ancestors. Succeeds if it
    /// already exists.
    pub fn create_all(&self) -> HfsResult<()> {
        let path = self.path();
        dir_builder(true)
            .create(&path)
            .map_err(|e| HfsError::from_io(&path, e))?;
        debug!(path = %path.display(), "created directory tree");
        Ok(())
    }

    /// Remove this directory, which must be empty.
    pub fn remove(&self) -> HfsResult<()> {
        let path = self.path();
        fs::remove_dir(&path).map_err(|e| HfsError::from_io(&path, e))?;
        debug!(path = %path.display(), "removed directory");
        Ok(())
    }

    /// Remove this directory and everything under it.
    ///
    /// There is no confirmation step. An already missing directory counts
    /// as removed.
    pub fn remove_all(&self) -> HfsResult<()> {
        let path = self.path();
        match fs::remove_dir_all(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "removed directory tree");
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(HfsError::Io(err)),
        }
    }

    /// Rename the directory within its parent, returning the OS error as is
    /// on failure.
    ///
    /// # Panics
    ///
    /// Panics if `new_name` is not a single path component.
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
        debug!(from = %old_path.display(), to = %new_path.display(), "renamed directory");
        Ok(())
    }

    pub fn move_to(&mut self, new_parent: impl AsRef<Path>) -> HfsResult<()> {
        let old_path = self.path();
        let old_parent = std::mem::replace(&mut self.parent, path::clean(new_parent));
        let new_path = self.path();

        if let Err(err) = fs::rename(&old_path, &new_path) {
            debug!(from = %old_path.display(), to = %new_path.display(), error = %err, "move failed, keeping old parent");
            self.parent = old_parent;
            return Err(HfsError::Io(err));
        }
        debug!(from = %old_path.display(), to = %new_path.display(), "moved directory");
        Ok(())
    }

    /// Read raw entries from the directory stream, in stream order.
    ///
    /// `limit` caps the number of entries; `None` or `Some(0)` reads them
    /// all.
    ///
    /// Entry metadata describes the entry itself, so a symlink is reported
    /// as a symlink rather than as its target.
    pub fn list_entries(&self, options: ListOptions) -> HfsResult<Vec<Entry>> {
        let path = self.path();
        let read_dir = fs::read_dir(&path).map_err(|e| HfsError::from_io(&path, e))?;
        let limit = options.limit.filter(|&n| n > 0).unwrap_or(usize::MAX);

        let mut entries = Vec::new();
        for item in read_dir.take(limit) {
            let item = item.map_err(|e| HfsError::from_io(&path, e))?;
            let meta = item.metadata().map_err(|e| HfsError::from_io(item.path(), e))?;
            entries.push(Entry::new(item.file_name(), Metadata::from(&meta)));
        }
        trace!(path = %path.display(), count = entries.len(), "listed directory");
        Ok(entries)
    }

    /// Every non-directory entry directly inside this directory.
    pub fn files(&self) -> HfsResult<Vec<FileHandle>> {
        let path = self.path();
        Ok(self
            .list_entries(ListOptions::all())?
            .into_iter()
            .filter(|entry| !entry.is_dir())
            .map(|entry| FileHandle::new(path.join(entry.name)))
            .collect())
    }

    /// Every directory directly inside this directory.
    pub fn dirs(&self) -> HfsResult<Vec<DirHandle>> {
        let path = self.path();
        Ok(self
            .list_entries(ListOptions::all())?
            .into_iter()
            .filter(Entry::is_dir)
            .map(|entry| DirHandle::new(path.join(entry.name)))
            .collect())
    }
}

fn dir_builder(recursive: bool) -> DirBuilder {
    let mut builder = DirBuilder::new();
    builder.recursive(recursive);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder
}

impl fmt::Display for DirHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path().display())
    }
}
