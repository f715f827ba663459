// SPDX-License-Identifier: AGPL-3.0-or-later
//! Local filesystem handles
//!
//! [`FileHandle`] and [`DirHandle`] are path references that split the path
//! into parent and name, load metadata lazily, and keep themselves
//! consistent with the disk across renames and moves: a failed rename or
//! move leaves the handle pointing at the original entity.
//!
//! Every call is synchronous and opens what it needs only for its own
//! duration.

mod dir;
mod file;
mod walk;

pub use dir::DirHandle;
pub use file::FileHandle;
pub use walk::{DirVisitor, FileVisitor};
pub use hfs_core::{Entry, EntryKind, HfsError, HfsResult, ListOptions, Metadata};

#[cfg(test)]
pub(crate) fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}
