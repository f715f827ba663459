// SPDX-License-Identifier: AGPL-3.0-or-later
//! Lexical path toolkit
//!
//! Everything here is pure string work on paths. Nothing touches the
//! filesystem, so `..` is resolved against the text, not against symlinks.

use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};

/// Normalize a path lexically.
///
/// Collapses repeated separators, drops `.` segments and resolves `..`
/// against the preceding segment. `..` directly under the root is dropped,
/// leading `..` of a relative path is kept. An empty result becomes `.`.
pub fn clean(path: impl AsRef<Path>) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for comp in path.as_ref().components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(comp),
            },
            other => out.push(other),
        }
    }

    if out.is_empty() {
        return PathBuf::from(".");
    }
    out.iter().collect()
}

/// Split a path into `(parent, name)` after cleaning it.
///
/// `clean(parent.join(name))` gives back the cleaned input. A bare name has
/// `.` as parent, and the filesystem root is its own parent and name.
/// The name is kept as raw OS text, so names that are not valid UTF-8
/// survive untouched.
pub fn split(path: impl AsRef<Path>) -> (PathBuf, OsString) {
    let cleaned = clean(path);
    let mut components = cleaned.components();
    let last = match components.next_back() {
        Some(last) => last,
        None => return (PathBuf::from("."), OsString::from(".")),
    };

    let name = last.as_os_str().to_os_string();
    match last {
        Component::RootDir | Component::Prefix(_) => (cleaned.clone(), name),
        _ => {
            let rest = components.as_path();
            let parent = if rest.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                rest.to_path_buf()
            };
            (parent, name)
        }
    }
}

/// Join `segments` onto `base` and clean the result.
///
/// Unlike [`Path::join`], an absolute segment is appended rather than
/// replacing what came before. Empty segments are ignored.
pub fn join<I, S>(base: impl AsRef<Path>, segments: I) -> PathBuf
where
    I: IntoIterator<Item = S>,
    S: AsRef<Path>,
{
    let mut joined = OsString::from(base.as_ref().as_os_str());
    for segment in segments {
        let segment = segment.as_ref().as_os_str();
        if segment.is_empty() {
            continue;
        }
        if !joined.is_empty() {
            joined.push(std::path::MAIN_SEPARATOR_STR);
        }
        joined.push(segment);
    }
    clean(PathBuf::from(joined))
}

/// Whether `name` is usable as a single path component.
///
/// Rejects separators as well as `""`, `.` and `..`, none of which name an
/// entry inside a directory.
pub fn is_valid_name(name: impl AsRef<OsStr>) -> bool {
    let name = name.as_ref();
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(only)), None) => only == name,
        _ => false,
    }
}

/// Abort on a bare name that is not a single path component.
///
/// Such a name can only come from a programming error upstream, so this
/// panics instead of returning an error.
///
/// # Panics
///
/// Panics when `name` contains a separator or is empty, `.` or `..`.
#[track_caller]
pub fn assert_name(name: impl AsRef<OsStr>) {
    let name = name.as_ref();
    if !is_valid_name(name) {
        panic!("invalid name: {:?}", Path::new(name).display().to_string());
    }
}

/// Split a file name at its last `.` into `(bare, extension)`.
///
/// A dot in first position marks a hidden file, not an extension. Works on
/// raw OS text, so non UTF-8 names split the same way.
pub fn split_extension(name: &OsStr) -> (&OsStr, &OsStr) {
    let as_path = Path::new(name);
    match (as_path.file_stem(), as_path.extension()) {
        (Some(bare), Some(ext)) => (bare, ext),
        _ => (name, OsStr::new("")),
    }
}
