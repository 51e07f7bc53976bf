//! This crate provisions isolated Python environments holding a project's dependencies

/// The default location of the script that bootstraps pip
pub static DEFAULT_GET_PIP_URL: &str = "https://bootstrap.pypa.io/get-pip.py";

/// The default directory of the environment, relative to the project root
pub static DEFAULT_ENV_PATH: &str = ".venv";

pub mod env;
pub mod error;
pub mod files;
pub mod project;
pub mod request;
pub mod tools;
pub mod util;
