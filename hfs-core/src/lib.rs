// SPDX-License-Identifier: AGPL-3.0-or-later
//! Handle FS Core
//!
//! Shared types for the handle layer: the error taxonomy, lexical path
//! helpers, metadata snapshots and directory entry records.

pub mod entry;
pub mod error;
pub mod metadata;
pub mod mime;
pub mod operations;
pub mod path;

pub use entry::{Entry, EntryKind};
pub use error::{HfsError, HfsResult};
pub use metadata::{Metadata, Permissions};
pub use operations::{ListOptions, DIR_MODE};
