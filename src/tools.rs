//! The tools that work on environments

pub mod announce;
pub mod envbuilder;
pub mod runner;

#[cfg(test)]
mod testing;
