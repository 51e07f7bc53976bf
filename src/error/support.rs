//! Conversions from foreign error types into the crate `Error`

use http::StatusCode;

use super::{Error, ErrorExt, ErrorType, Throwable};

impl<T> ErrorExt<T> for Result<T, std::io::Error> {
    fn e_context<F: Fn() -> String>(self, context: F) -> Result<T, Error> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(Error::new_context(ErrorType::IO(e), context())),
        }
    }
}

impl Throwable for std::io::Error {
    fn throw(self, context: String) -> Error {
        Error::new_context(ErrorType::IO(self), context)
    }
}

/// A TOML error
#[derive(Debug)]
pub enum TOMLError {
    /// Deserialization errors
    Deserialize(toml::de::Error),
}

impl std::fmt::Display for TOMLError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deserialize(e) => write!(f, "Deserialization error: {e}"),
        }
    }
}

impl<T> ErrorExt<T> for Result<T, toml::de::Error> {
    fn e_context<F: Fn() -> String>(self, context: F) -> Result<T, Error> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(Error::new_context(
                ErrorType::TOML(TOMLError::Deserialize(e)),
                context(),
            )),
        }
    }
}

impl Throwable for toml::de::Error {
    fn throw(self, context: String) -> Error {
        Error::new_context(ErrorType::TOML(TOMLError::Deserialize(self)), context)
    }
}

/// An error while transferring data using CURL
#[derive(Debug)]
pub enum CURLError {
    /// An error reported by libcurl itself
    Curl(curl::Error),
    /// The server responded with a status code that is not valid HTTP
    InvalidStatus(u32),
    /// The server responded with a non-success status
    ErrorStatus(StatusCode),
}

impl std::fmt::Display for CURLError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Curl(e) => e.fmt(f),
            Self::InvalidStatus(code) => write!(f, "Invalid HTTP status code {code}"),
            Self::ErrorStatus(status) => write!(f, "Server responded with {status}"),
        }
    }
}

impl<T> ErrorExt<T> for Result<T, curl::Error> {
    fn e_context<F: Fn() -> String>(self, context: F) -> Result<T, Error> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(Error::new_context(
                ErrorType::CURL(CURLError::Curl(e)),
                context(),
            )),
        }
    }
}

impl Throwable for curl::Error {
    fn throw(self, context: String) -> Error {
        Error::new_context(ErrorType::CURL(CURLError::Curl(self)), context)
    }
}

impl Throwable for CURLError {
    fn throw(self, context: String) -> Error {
        Error::new_context(ErrorType::CURL(self), context)
    }
}
