// SPDX-License-Identifier: AGPL-3.0-or-later
//! Fuzz target for lexical path cleaning, splitting and joining

#![no_main]

use hfs_core::path::{clean, is_valid_name, join, split, split_extension};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(input) = std::str::from_utf8(data) {
        let cleaned = clean(input);

        // Cleaning is idempotent.
        assert_eq!(clean(&cleaned), cleaned);

        // Splitting never loses the path.
        let (parent, name) = split(input);
        assert_eq!(clean(parent.join(&name)), cleaned);

        // Decomposed names are single components, except the root and a
        // leading parent reference.
        if parent != cleaned && name.as_os_str() != ".." {
            assert!(is_valid_name(&name));
        }

        let (bare, ext) = split_extension(&name);
        if !ext.is_empty() {
            let mut rebuilt = bare.to_os_string();
            rebuilt.push(".");
            rebuilt.push(ext);
            assert_eq!(rebuilt, name);
        }

        if let Some((head, tail)) = input.split_once(':') {
            let _ = join(head, tail.split(','));
        }
    }
});
