//! Environment structures to represent the environments executables run in

use std::{
    collections::HashMap,
    ffi::OsString,
    path::{Path, PathBuf},
};

use crate::error::Error;

mod executable;
pub use executable::*;

mod venv;
pub use venv::*;

/// The information about a created environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvContext {
    /// The root directory of the environment
    pub env_dir: PathBuf,
    /// The interpreter executable inside the environment
    pub env_exe: PathBuf,
    /// The directory containing the environment's scripts and binaries
    pub bin_path: PathBuf,
    /// The prompt text the environment shows when activated
    pub prompt: String,
}

impl EnvContext {
    /// Derives the context of an environment rooted at `env_dir` using the platform's layout:
    /// `Scripts/python.exe` on Windows, `bin/python` everywhere else
    /// # Arguments
    /// * `env_dir` - The root of the environment
    /// * `prompt` - The prompt text of the environment
    pub fn new(env_dir: PathBuf, prompt: String) -> Self {
        let (bin_path, env_exe) = if cfg!(windows) {
            let bin = env_dir.join("Scripts");
            (bin.clone(), bin.join("python.exe"))
        } else {
            let bin = env_dir.join("bin");
            (bin.clone(), bin.join("python"))
        };

        Self {
            env_dir,
            env_exe,
            bin_path,
            prompt,
        }
    }
}

/// An environment that can execute `EnvironmentExecutables` using its own interpreter
pub trait Environment {
    /// Returns the context describing this environment
    fn context(&self) -> &EnvContext;

    /// Executes a `EnvironmentExecutable` in the environment and waits for it to exit
    /// # Arguments
    /// * `executable` - A reference to the executable to execute
    fn execute(
        &self,
        executable: &dyn EnvironmentExecutable,
    ) -> Result<std::process::ExitStatus, Error>;
}

/// An executable that can be executed in a `Environment`
pub trait EnvironmentExecutable {
    /// Returns the name of the executable to ease identification
    fn get_name(&self) -> String;

    /// Returns a hash map of additional environment variables to pass to the process
    fn get_env_variables(&self) -> HashMap<String, String>;

    /// Returns the arguments to hand to the interpreter
    fn get_args(&self) -> Vec<OsString>;

    /// Returns the directory to run the command in, `None` for the environment's default
    fn get_workdir(&self) -> Option<&Path>;

    /// Returns the bytes to feed the process on its standard input, if any
    fn get_stdin(&self) -> Option<&[u8]>;
}

/// The options for creating a new environment
#[derive(Debug, Clone)]
pub struct CreateOptions {
    /// The label of the environment, used by the creation primitive as its prompt name
    pub label: String,
    /// The prompt text that replaces the primitive's default prompt
    pub prompt: String,
    /// Whether the system (global) site-packages are visible inside the environment
    pub system_site_packages: bool,
}

/// Something that can create new environments on disk
pub trait EnvironmentCreator {
    /// Creates the directory structure of an environment at `target`
    /// # Arguments
    /// * `target` - The directory to create the environment in, may or may not exist
    /// * `options` - The options for the new environment
    fn create(&self, target: &Path, options: &CreateOptions) -> Result<Box<dyn Environment>, Error>;
}
