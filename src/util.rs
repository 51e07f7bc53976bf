//! Various utility functions, structs and traits

pub mod download;
pub mod fs;
pub mod parse;
pub mod string;
