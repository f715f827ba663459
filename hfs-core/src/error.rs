// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for Handle FS

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias
pub type HfsResult<T> = Result<T, HfsError>;

/// Main error type
///
/// The path-carrying variants are the distinguished sentinels callers match
/// on. Everything else the OS reports is carried verbatim in [`HfsError::Io`].
#[derive(Error, Debug)]
pub enum HfsError {
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Is a directory: {}", .0.display())]
    IsDirectory(PathBuf),

    #[error("Is a file: {}", .0.display())]
    IsFile(PathBuf),

    #[error("Is not a regular file: {}", .0.display())]
    IsNotRegular(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl HfsError {
    /// Classify an OS error raised while operating on `path`.
    ///
    /// `NotFound` becomes the sentinel, every other kind passes through.
    pub fn from_io(path: impl AsRef<Path>, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            HfsError::NotFound(path.as_ref().to_path_buf())
        } else {
            HfsError::Io(err)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, HfsError::NotFound(_))
    }

    /// Something exists at the path, but not of the expected kind.
    pub fn is_kind_mismatch(&self) -> bool {
        matches!(
            self,
            HfsError::IsDirectory(_) | HfsError::IsFile(_) | HfsError::IsNotRegular(_)
        )
    }

    /// Whether a failed `exists()` still proves an entity is at the path.
    ///
    /// Irregular files (sockets, devices) report non-existence for a file
    /// handle, so only the file/directory mismatches count.
    pub fn implies_existence(&self) -> bool {
        matches!(self, HfsError::IsDirectory(_) | HfsError::IsFile(_))
    }

    /// The path the error refers to, when it names one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            HfsError::NotFound(p)
            | HfsError::IsDirectory(p)
            | HfsError::IsFile(p)
            | HfsError::IsNotRegular(p) => Some(p),
            HfsError::Io(_) => None,
        }
    }
}
