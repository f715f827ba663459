// SPDX-License-Identifier: AGPL-3.0-or-later
//! File and directory metadata

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;

use crate::entry::EntryKind;

/// Snapshot of what a stat call reported for one path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub kind: EntryKind,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    pub permissions: Permissions,
}

/// Unix-style permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    pub mode: u32,
}

impl Permissions {
    pub fn new(mode: u32) -> Self {
        Self { mode }
    }

    pub fn is_readable(&self) -> bool {
        self.mode & 0o444 != 0
    }

    pub fn is_writable(&self) -> bool {
        self.mode & 0o222 != 0
    }

    pub fn is_executable(&self) -> bool {
        self.mode & 0o111 != 0
    }

    #[cfg(unix)]
    fn from_std(meta: &fs::Metadata) -> Self {
        use std::os::unix::fs::PermissionsExt;
        Self::new(meta.permissions().mode() & 0o7777)
    }

    #[cfg(not(unix))]
    fn from_std(meta: &fs::Metadata) -> Self {
        let base = if meta.is_dir() { 0o755 } else { 0o644 };
        if meta.permissions().readonly() {
            Self::new(base & !0o222)
        } else {
            Self::new(base)
        }
    }
}

impl Metadata {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_regular(&self) -> bool {
        self.kind == EntryKind::File
    }
}

impl From<&fs::Metadata> for Metadata {
    fn from(meta: &fs::Metadata) -> Self {
        let file_type = meta.file_type();
        let kind = if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_symlink() {
            EntryKind::Symlink
        } else {
            EntryKind::Unknown
        };

        Self {
            kind,
            size: meta.len(),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
            permissions: Permissions::from_std(meta),
        }
    }
}
