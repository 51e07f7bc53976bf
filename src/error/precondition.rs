//! Precondition errors, detected before any environment is touched

use std::path::PathBuf;

use super::{Error, ErrorExt, ErrorType, Throwable};

/// A violated precondition for provisioning an environment
#[derive(Debug)]
pub enum PreconditionError {
    /// The environment label is empty
    MissingEnvironmentLabel,
    /// The bootstrap script source is set but empty
    InvalidBootstrapSource,
    /// The project declares legacy dependency links
    DependencyLinks,
    /// An extra was requested that the project does not declare
    UnknownExtra {
        extra: String,
        available: Vec<String>,
    },
    /// No usable project descriptor was found in `root`
    MissingDescriptor { root: PathBuf },
    /// The project descriptor does not name the project
    MissingProjectName { descriptor: PathBuf },
}

impl std::fmt::Display for PreconditionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEnvironmentLabel => write!(f, "Virtual environment must have a name"),
            Self::InvalidBootstrapSource => write!(f, "Invalid get-pip.py url"),
            Self::DependencyLinks => write!(f, "Dependency links are not supported anymore"),
            Self::UnknownExtra { extra, available } => write!(
                f,
                "Unknown extra '{}', available extras: {}",
                extra,
                available.join(", ")
            ),
            Self::MissingDescriptor { root } => write!(
                f,
                "No pyproject.toml found at project: {}",
                root.to_string_lossy()
            ),
            Self::MissingProjectName { descriptor } => write!(
                f,
                "{} does not declare 'project.name'",
                descriptor.to_string_lossy()
            ),
        }
    }
}

impl<T> ErrorExt<T> for Result<T, PreconditionError> {
    fn e_context<F: Fn() -> String>(self, context: F) -> Result<T, Error> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(Error::new_context(ErrorType::Precondition(e), context())),
        }
    }
}

impl Throwable for PreconditionError {
    fn throw(self, context: String) -> Error {
        Error::new_context(ErrorType::Precondition(self), context)
    }
}
