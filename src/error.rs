//! Common error structure used all over venvtools

use std::collections::LinkedList;

use crate::tools::envbuilder::EnvError;

pub mod support;

mod download;
pub use download::*;

mod precondition;
pub use precondition::*;

use support::{CURLError, TOMLError};

/// The type of error at hand
#[derive(Debug)]
pub enum ErrorType {
    IO(std::io::Error),
    TOML(TOMLError),
    CURL(CURLError),
    Download(DownloadError),
    Precondition(PreconditionError),
    Env(EnvError),
    Other(String),
}

/// The error struct, containing the error and a context
#[derive(Debug)]
pub struct Error {
    /// A stack of contexes the error occured in
    pub context: LinkedList<String>,
    /// The error itself
    pub error: ErrorType,
}

/// Traits for handling error contexts
pub trait ErrorExt<T> {
    /// Adds context to an error. This function takes a trait, so strings do only get constructed when needed
    /// # Arguments
    /// * `context` - A closure that returns the context message
    fn e_context<F: Fn() -> String>(self, context: F) -> Result<T, Error>;
}

/// A trait for types that can be populated to an `Error`
pub trait Throwable {
    /// Converts `self` to an `Error` with the supplied context
    fn throw(self, context: String) -> Error;
}

impl Error {
    /// Creates a new `Error`
    /// # Arguments
    /// * `error` - The error to use as a basis for the message
    pub fn new(error: ErrorType) -> Self {
        Self {
            context: LinkedList::new(),
            error,
        }
    }

    /// Creates a new `Error` with context
    /// # Arguments
    /// * `error` - The error to use as a basis for the message
    /// * `context` - The initial context message
    pub fn new_context(error: ErrorType, context: String) -> Self {
        Self {
            context: {
                let mut l = LinkedList::new();
                l.push_back(context);
                l
            },
            error,
        }
    }

    /// Returns the `EnvError` this error wraps, if any
    pub fn as_env_error(&self) -> Option<&EnvError> {
        match &self.error {
            ErrorType::Env(e) => Some(e),
            _ => None,
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IO(e) => e.fmt(f),
            Self::TOML(e) => e.fmt(f),
            Self::CURL(e) => e.fmt(f),
            Self::Download(e) => e.fmt(f),
            Self::Precondition(e) => e.fmt(f),
            Self::Env(e) => e.fmt(f),
            Self::Other(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed while")?;
        for (i, context) in self.context.iter().enumerate() {
            write!(f, "\n{}-- {}:", "  ".repeat(i), context)?
        }
        write!(f, "\n{}-- {}", "  ".repeat(self.context.len()), self.error)
    }
}

impl<T> ErrorExt<T> for Result<T, Error> {
    fn e_context<F: Fn() -> String>(self, context: F) -> Result<T, Error> {
        match self {
            Ok(v) => Ok(v),
            Err(mut e) => {
                e.context.push_front(context());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_indents_context_chain() {
        let err: Result<(), Error> = Err(Error::new_context(
            ErrorType::Other("boom".to_owned()),
            "Inner".to_owned(),
        ));
        let err = err.e_context(|| "Outer".to_owned()).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed while\n-- Outer:\n  -- Inner:\n    -- boom"
        );
    }
}
