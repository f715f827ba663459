// SPDX-License-Identifier: AGPL-3.0-or-later
//! File system entries

use crate::Metadata;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;

/// Entry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    File,
    Directory,
    Symlink,
    Unknown,
}

/// One raw record read from a directory stream
///
/// The name is the raw OS file name, which need not be valid UTF-8.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: OsString,
    pub metadata: Metadata,
}

impl Entry {
    pub fn new(name: impl Into<OsString>, metadata: Metadata) -> Self {
        Self { name: name.into(), metadata }
    }

    pub fn kind(&self) -> EntryKind {
        self.metadata.kind
    }

    pub fn is_dir(&self) -> bool {
        self.metadata.is_dir()
    }

    pub fn size(&self) -> u64 {
        self.metadata.size
    }
}
