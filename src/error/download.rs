//! Download errors

use super::{Error, ErrorExt, ErrorType, Throwable};

/// An error when downloading into memory
#[derive(Debug)]
pub enum DownloadError {
    /// The resource at `url` is larger than `limit` bytes
    LimitExceeded { url: String, limit: usize },
}

impl std::fmt::Display for DownloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LimitExceeded { url, limit } => {
                write!(f, "Download of {url} exceeds the limit of {limit} bytes")
            }
        }
    }
}

impl<T> ErrorExt<T> for Result<T, DownloadError> {
    fn e_context<F: Fn() -> String>(self, context: F) -> Result<T, Error> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(Error::new_context(ErrorType::Download(e), context())),
        }
    }
}

impl Throwable for DownloadError {
    fn throw(self, context: String) -> Error {
        Error::new_context(ErrorType::Download(self), context)
    }
}
