use std::path::{Path, PathBuf};

/// Common utility functions for `Path` structures
pub trait PathUtil {
    /// Returns the path as a lossy string by using `.to_string_lossy()` and `.to_string()`
    fn str_lossy(&self) -> String;
}

impl PathUtil for PathBuf {
    fn str_lossy(&self) -> String {
        self.to_string_lossy().to_string()
    }
}

impl PathUtil for Path {
    fn str_lossy(&self) -> String {
        self.to_string_lossy().to_string()
    }
}
