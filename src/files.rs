//! The data structures of the files venvtools reads and writes

pub mod pipconf;
pub mod pyproject;
