//! Utilities for interacting with a filesystem

mod pathutil;
pub use pathutil::*;

use crate::error::{Error, ErrorExt};
use log::trace;
use std::path::Path;

/// Creates a directory and all of its parents
///
/// Uses the [std::fs::create_dir_all()] function
pub fn create_dir_all(path: &Path) -> Result<(), Error> {
    trace!("Creating directory '{}'", path.str_lossy());
    std::fs::create_dir_all(path).e_context(|| format!("Creating directory '{}'", path.str_lossy()))
}

/// Removes a directory and all of its contents
///
/// Uses the [std::fs::remove_dir_all()] function
pub fn remove_dir_all(path: &Path) -> Result<(), Error> {
    trace!("Removing directory '{}'", path.str_lossy());
    std::fs::remove_dir_all(path).e_context(|| format!("Removing directory '{}'", path.str_lossy()))
}

/// Writes `contents` to the file at `path`, replacing it if it exists
///
/// Uses the [std::fs::write()] function
pub fn write_file(path: &Path, contents: &str) -> Result<(), Error> {
    trace!("Writing file '{}'", path.str_lossy());
    std::fs::write(path, contents).e_context(|| format!("Writing file '{}'", path.str_lossy()))
}
