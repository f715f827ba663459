// SPDX-License-Identifier: AGPL-3.0-or-later
//! Recursive traversal

use hfs_core::{HfsError, Metadata};
use std::io;
use std::path::Path;
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::{DirHandle, FileHandle};

/// Plain function visitor for files, handy to spell out an absent `on_file`
/// as `None::<FileVisitor<E>>`.
pub type FileVisitor<E> = fn(FileHandle) -> Result<(), E>;

/// Plain function visitor for directories, see [`FileVisitor`].
pub type DirVisitor<E> = fn(DirHandle) -> Result<(), E>;

impl DirHandle {
    /// Depth-first walk of the tree rooted at this directory.
    ///
    /// The root itself is visited first. Directories go to `on_dir` and
    /// every other entry to `on_file`; a `None` visitor skips that kind.
    /// Entries within one directory come in file name order. Handles carry
    /// the metadata read during the walk, except for non-regular files which
    /// are handed over with an empty cache.
    ///
    /// The first error stops the walk and is returned, whether a visitor
    /// raised it or the tree could not be read. Symlinks are not followed.
    ///
    /// ```no_run
    /// use hfs_local::{DirHandle, DirVisitor, FileHandle, HfsError};
    ///
    /// let mut total = 0;
    /// DirHandle::new("/var/log").walk(
    ///     Some(|f: FileHandle| {
    ///         total += f.cached_metadata().map_or(0, |m| m.size);
    ///         Ok(())
    ///     }),
    ///     None::<DirVisitor<HfsError>>,
    /// )?;
    /// # Ok::<(), HfsError>(())
    /// ```
    pub fn walk<F, D, E>(&self, mut on_file: Option<F>, mut on_dir: Option<D>) -> Result<(), E>
    where
        F: FnMut(FileHandle) -> Result<(), E>,
        D: FnMut(DirHandle) -> Result<(), E>,
        E: From<HfsError>,
    {
        let root = self.path();
        debug!(root = %root.display(), "walking directory tree");

        for item in WalkDir::new(&root).sort_by_file_name() {
            let entry = item.map_err(|err| walk_error(&root, err))?;
            let metadata = entry.metadata().map_err(|err| walk_error(&root, err))?;
            let metadata = Metadata::from(&metadata);
            trace!(path = %entry.path().display(), kind = ?metadata.kind, "walk entry");

            if metadata.is_dir() {
                if let Some(visit) = on_dir.as_mut() {
                    visit(DirHandle::with_metadata(entry.path(), metadata))?;
                }
            } else if let Some(visit) = on_file.as_mut() {
                let file = if metadata.is_regular() {
                    FileHandle::with_metadata(entry.path(), metadata)
                } else {
                    FileHandle::new(entry.path())
                };
                visit(file)?;
            }
        }
        Ok(())
    }

    /// Walk visiting files only.
    pub fn walk_files<F, E>(&self, on_file: F) -> Result<(), E>
    where
        F: FnMut(FileHandle) -> Result<(), E>,
        E: From<HfsError>,
    {
        self.walk(Some(on_file), None::<DirVisitor<E>>)
    }

    /// Walk visiting directories only, the root included.
    pub fn walk_dirs<D, E>(&self, on_dir: D) -> Result<(), E>
    where
        D: FnMut(DirHandle) -> Result<(), E>,
        E: From<HfsError>,
    {
        self.walk(None::<FileVisitor<E>>, Some(on_dir))
    }
}

fn walk_error(root: &Path, err: walkdir::Error) -> HfsError {
    let path = err.path().unwrap_or(root).to_path_buf();
    debug!(path = %path.display(), error = %err, "walk aborted");
    HfsError::from_io(path, io::Error::from(err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init_test_tracing;
    use hfs_core::HfsResult;
    use std::cell::Cell;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::{tempdir, TempDir};

    /// root/
    ///   a.txt
    ///   b.txt
    ///   docs/
    ///     guide.md
    ///     api/
    ///       index.html
    ///   empty/
    fn sample_tree() -> TempDir {
        let tmp = tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("docs/api")).unwrap();
        fs::create_dir(root.join("empty")).unwrap();
        fs::write(root.join("a.txt"), b"a").unwrap();
        fs::write(root.join("b.txt"), b"bb").unwrap();
        fs::write(root.join("docs/guide.md"), b"# guide").unwrap();
        fs::write(root.join("docs/api/index.html"), b"<html></html>").unwrap();
        tmp
    }

    #[test]
    fn test_walk_counts() {
        init_test_tracing();
        let tmp = sample_tree();
        let root = DirHandle::new(tmp.path());

        let files = Cell::new(0);
        let dirs = Cell::new(0);
        let result: HfsResult<()> = root.walk(
            Some(|_: FileHandle| {
                files.set(files.get() + 1);
                Ok(())
            }),
            Some(|_: DirHandle| {
                dirs.set(dirs.get() + 1);
                Ok(())
            }),
        );

        result.unwrap();
        assert_eq!(files.get(), 4);
        // docs, docs/api, empty and the root itself
        assert_eq!(dirs.get(), 4);
    }

    #[test]
    fn test_walk_order_and_paths() {
        let tmp = sample_tree();
        let root = DirHandle::new(tmp.path());

        let mut seen = Vec::new();
        let result: HfsResult<()> = root.walk(
            Some(|f: FileHandle| {
                seen.push(f.path());
                Ok(())
            }),
            None::<DirVisitor<HfsError>>,
        );
        result.unwrap();

        let expected: Vec<PathBuf> = ["a.txt", "b.txt", "docs/api/index.html", "docs/guide.md"]
            .iter()
            .map(|p| tmp.path().join(p))
            .collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_walk_root_first() {
        let tmp = sample_tree();
        let root = DirHandle::new(tmp.path());

        let mut dirs = Vec::new();
        root.walk_dirs(|d| {
            dirs.push(d.path());
            Ok::<_, HfsError>(())
        })
        .unwrap();

        assert_eq!(dirs.first(), Some(&root.path()));
        assert_eq!(dirs.len(), 4);
    }

    #[test]
    fn test_walk_prepopulates_metadata() {
        let tmp = sample_tree();
        let root = DirHandle::new(tmp.path());

        root.walk(
            Some(|f: FileHandle| {
                let meta = f.cached_metadata().expect("file metadata from walk");
                assert!(meta.is_regular());
                if f.name() == "b.txt" {
                    assert_eq!(meta.size, 2);
                }
                Ok::<_, HfsError>(())
            }),
            Some(|d: DirHandle| {
                assert!(d.cached_metadata().expect("dir metadata from walk").is_dir());
                Ok(())
            }),
        )
        .unwrap();
    }

    #[test]
    fn test_walk_without_visitors() {
        let tmp = sample_tree();
        let root = DirHandle::new(tmp.path());
        let result: HfsResult<()> =
            root.walk(None::<FileVisitor<HfsError>>, None::<DirVisitor<HfsError>>);
        result.unwrap();
    }

    #[test]
    fn test_visitor_error_stops_walk() {
        let tmp = sample_tree();
        let root = DirHandle::new(tmp.path());

        let calls = Cell::new(0);
        let stop_after = 3;
        let visit = || -> HfsResult<()> {
            calls.set(calls.get() + 1);
            if calls.get() == stop_after {
                Err(HfsError::Io(io::Error::other("enough")))
            } else {
                Ok(())
            }
        };

        let err = root
            .walk(Some(|_: FileHandle| visit()), Some(|_: DirHandle| visit()))
            .unwrap_err();
        assert_eq!(err.to_string(), "IO error: enough");
        assert_eq!(calls.get(), stop_after);
    }

    #[derive(Debug)]
    enum IndexError {
        Fs(HfsError),
        TooLarge(String),
    }

    impl From<HfsError> for IndexError {
        fn from(err: HfsError) -> Self {
            IndexError::Fs(err)
        }
    }

    #[test]
    fn test_walk_with_caller_error_type() {
        let tmp = sample_tree();
        let root = DirHandle::new(tmp.path());

        let err = root
            .walk_files(|f| {
                if f.cached_metadata().map_or(0, |m| m.size) > 5 {
                    return Err(IndexError::TooLarge(f.name().to_string_lossy().into_owned()));
                }
                Ok(())
            })
            .unwrap_err();
        // docs/api/index.html is the first file over the limit
        assert!(matches!(err, IndexError::TooLarge(ref name) if name == "index.html"));

        let missing = DirHandle::new(tmp.path().join("missing"));
        let err = missing.walk_files(|_| Ok::<_, IndexError>(())).unwrap_err();
        assert!(matches!(err, IndexError::Fs(HfsError::NotFound(_))));
    }

    #[test]
    fn test_walk_missing_root() {
        let tmp = tempdir().unwrap();
        let root = DirHandle::new(tmp.path().join("nope"));

        let visited = Cell::new(false);
        let err = root
            .walk_files(|_| {
                visited.set(true);
                Ok::<_, HfsError>(())
            })
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(!visited.get());
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_does_not_follow_symlinks() {
        let tmp = sample_tree();
        std::os::unix::fs::symlink(tmp.path().join("docs"), tmp.path().join("link")).unwrap();
        let root = DirHandle::new(tmp.path());

        let mut links = Vec::new();
        root.walk_files(|f| {
            if f.name() == "link" {
                links.push(f.cached_metadata().is_none());
            }
            Ok::<_, HfsError>(())
        })
        .unwrap();
        // Reported once, as a non-directory entry without a regular-file cache.
        assert_eq!(links, vec![true]);
    }

    #[test]
    fn test_walk_stops_when_entry_vanishes() {
        let tmp = tempdir().unwrap();
        fs::create_dir(tmp.path().join("a_first")).unwrap();
        fs::create_dir(tmp.path().join("b_victim")).unwrap();
        fs::write(tmp.path().join("b_victim/inner.txt"), b"x").unwrap();
        fs::write(tmp.path().join("c_last.txt"), b"x").unwrap();
        let root = DirHandle::new(tmp.path());

        // The root listing is taken before b_victim disappears, so the walk
        // reaches an entry it can no longer stat.
        let victim = tmp.path().join("b_victim");
        let mut dirs = Vec::new();
        let mut files = Vec::new();
        let err = root
            .walk(
                Some(|f: FileHandle| {
                    files.push(f.path());
                    Ok(())
                }),
                Some(|d: DirHandle| -> HfsResult<()> {
                    if d.name() == "a_first" {
                        fs::remove_dir_all(&victim)?;
                    }
                    dirs.push(d.path());
                    Ok(())
                }),
            )
            .unwrap_err();

        assert!(matches!(err, HfsError::NotFound(ref p) if p == &victim));
        assert_eq!(dirs, vec![root.path(), tmp.path().join("a_first")]);
        assert!(files.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_stops_on_unreadable_dir() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempdir().unwrap();
        let locked = tmp.path().join("locked");
        fs::write(tmp.path().join("a.txt"), b"a").unwrap();
        fs::create_dir(&locked).unwrap();
        fs::write(tmp.path().join("z.txt"), b"z").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Privileged users read through the mode bits.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let root = DirHandle::new(tmp.path());
        let seen = std::cell::RefCell::new(Vec::new());
        let result: HfsResult<()> = root.walk(
            Some(|f: FileHandle| {
                seen.borrow_mut().push(f.path());
                Ok(())
            }),
            Some(|d: DirHandle| {
                seen.borrow_mut().push(d.path());
                Ok(())
            }),
        );
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        match result.unwrap_err() {
            HfsError::Io(err) => assert_eq!(err.kind(), io::ErrorKind::PermissionDenied),
            other => panic!("unexpected error: {other:?}"),
        }
        let expected = vec![root.path(), tmp.path().join("a.txt"), locked];
        assert_eq!(seen.into_inner(), expected);
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let tmp = tempdir().unwrap();
        let raw = OsStr::from_bytes(b"log\xff.txt");
        fs::write(tmp.path().join(raw), b"entry").unwrap();
        let root = DirHandle::new(tmp.path());

        let mut names = Vec::new();
        root.walk_files(|mut f: FileHandle| -> HfsResult<()> {
            assert!(f.exists()?);
            names.push(f.name().to_os_string());
            Ok(())
        })
        .unwrap();
        assert_eq!(names, vec![raw.to_os_string()]);
    }
}
