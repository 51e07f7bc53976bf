//! Runs the environment's interpreter and turns failures into errors

use std::path::{Path, PathBuf};

use crate::{
    env::{Environment, PythonExecutable, PythonTarget},
    error::{Error, ErrorExt, Throwable},
    tools::{announce::Announcer, envbuilder::EnvError},
    util::download::ScriptFetcher,
};

/// One invocation of the environment's interpreter
#[derive(Debug, Clone)]
pub struct Invocation {
    /// The module to run if there is no `url`, also used to identify the invocation
    pub name: String,
    /// The arguments following the module or script
    pub args: Vec<String>,
    /// A local path or remote location of a script to run instead of `name`
    pub url: Option<String>,
    /// The working directory, the environment's scripts directory if `None`
    pub cwd: Option<PathBuf>,
    /// A human-readable description for progress messages
    pub message: Option<String>,
}

impl Invocation {
    /// Runs the module `name` with `args`
    pub fn module(name: &str, args: Vec<String>) -> Self {
        Self {
            name: name.to_owned(),
            args,
            url: None,
            cwd: None,
            message: None,
        }
    }

    /// Runs the script at `url`, identified by `name`, with `args`
    pub fn script(name: &str, url: &str, args: Vec<String>) -> Self {
        Self {
            url: Some(url.to_owned()),
            ..Self::module(name, args)
        }
    }

    /// Sets the working directory
    pub fn cwd(mut self, cwd: &Path) -> Self {
        self.cwd = Some(cwd.to_path_buf());
        self
    }

    /// Sets the progress message
    pub fn message(mut self, message: &str) -> Self {
        self.message = Some(message.to_owned());
        self
    }

    /// What the invocation runs: the script location if any, else the module name
    pub fn identity(&self) -> &str {
        self.url.as_deref().unwrap_or(&self.name)
    }
}

/// Runs `Invocation`s inside an environment
///
/// A non-zero exit status is an error, there are no retries.
pub struct ProcessRunner<'a> {
    announcer: &'a dyn Announcer,
    fetcher: &'a dyn ScriptFetcher,
    verbose: bool,
}

impl<'a> ProcessRunner<'a> {
    /// Creates a new runner
    /// # Arguments
    /// * `announcer` - The sink for progress messages
    /// * `fetcher` - The fetcher for remote scripts
    /// * `verbose` - Whether to show download progress
    pub fn new(
        announcer: &'a dyn Announcer,
        fetcher: &'a dyn ScriptFetcher,
        verbose: bool,
    ) -> Self {
        Self {
            announcer,
            fetcher,
            verbose,
        }
    }

    /// Runs `invocation` in `environment`
    ///
    /// A `url` naming an existing file is run by its path. Any other `url` is downloaded
    /// completely into memory first and then streamed to the interpreter's standard input.
    /// # Arguments
    /// * `environment` - The environment to run in
    /// * `invocation` - What to run
    /// # Errors
    /// - Download errors, in which case nothing has been executed
    /// - `EnvError::CommandFailed` if the process exits with a non-zero status
    pub fn run(&self, environment: &dyn Environment, invocation: &Invocation) -> Result<(), Error> {
        let context = || format!("Running {}", invocation.identity());

        let target = match &invocation.url {
            // The child runs in another directory, relative paths have to be resolved here
            Some(url) if Path::new(url).is_file() => PythonTarget::Script(
                std::fs::canonicalize(url)
                    .e_context(|| format!("Resolving script path {url}"))?,
            ),
            Some(url) => {
                self.announcer.announce(&format!("Downloading {url}"));
                let data = self.fetcher.fetch(url, self.verbose).e_context(context)?;
                PythonTarget::Stdin(data)
            }
            None => PythonTarget::Module(invocation.name.clone()),
        };

        let mut executable =
            PythonExecutable::new(invocation.name.clone(), target, invocation.args.clone());
        executable.workdir = invocation.cwd.clone();

        self.announcer.announce(&format!(
            "Executing {}",
            invocation.message.as_deref().unwrap_or(&invocation.name)
        ));

        let status = environment.execute(&executable).e_context(context)?;
        if !status.success() {
            return Err(EnvError::CommandFailed {
                command: invocation.identity().to_owned(),
                args: invocation.args.clone(),
                status,
            }
            .throw(context()));
        }

        self.announcer.announce("Done");
        Ok(())
    }
}
