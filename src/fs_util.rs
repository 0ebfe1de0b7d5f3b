//! Symlink-safe filesystem helpers.
//!
//! These use `symlink_metadata()` instead of `metadata()` so that generated
//! output is never written through a symlink planted in the output directory.

use std::fs;
use std::path::Path;

use crate::errors::{Result, TokencastError};

/// Returns `true` if the path is a regular file (not a symlink).
#[must_use]
pub fn is_regular_file(path: &Path) -> bool {
    path.symlink_metadata()
        .map(|m| m.file_type().is_file())
        .unwrap_or(false)
}

/// Returns `true` if the path is a symlink.
#[must_use]
pub fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata()
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// Outcome of [`write_if_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    Created,
    Updated,
    Unchanged,
}

/// Read an existing output file, or `None` if there is none yet.
///
/// # Errors
///
/// Refuses to follow a symlink or read anything that is not a regular file.
pub fn read_existing(path: &Path) -> Result<Option<String>> {
    if is_symlink(path) || (path.exists() && !is_regular_file(path)) {
        return Err(TokencastError::Build {
            message: format!("refusing to use non-regular file {}", path.display()),
        });
    }
    if !path.exists() {
        return Ok(None);
    }
    Ok(Some(fs::read_to_string(path)?))
}

/// Write `contents` to `path` unless it already holds exactly that.
///
/// Parent directories are created as needed.
///
/// # Errors
///
/// Fails on I/O errors or when `path` is a symlink or other non-regular file.
pub fn write_if_changed(path: &Path, contents: &str) -> Result<WriteStatus> {
    let status = match read_existing(path)? {
        Some(existing) if existing == contents => return Ok(WriteStatus::Unchanged),
        Some(_) => WriteStatus::Updated,
        None => WriteStatus::Created,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(status)
}
