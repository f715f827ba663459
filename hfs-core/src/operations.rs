// SPDX-License-Identifier: AGPL-3.0-or-later
//! Operation options

use serde::{Deserialize, Serialize};

/// Mode for directories created by a handle (rwxr-xr-x)
pub const DIR_MODE: u32 = 0o755;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOptions {
    /// Maximum number of entries to read, `None` for all of them
    pub limit: Option<usize>,
}

impl ListOptions {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn limit(limit: usize) -> Self {
        Self { limit: Some(limit) }
    }
}
