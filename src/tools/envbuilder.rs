//! The environment builder, provisioning an environment with a project's dependencies
//!
//! The steps run strictly in order, each one only after the previous one succeeded:
//! 1. Create the environment
//! 2. Write the installer configuration into it
//! 3. Check for the installer, bootstrapping it if it is missing
//! 4. Install the setup prerequisites
//! 5. Install the project and its dependencies
//! 6. Uninstall the project again, leaving only its dependencies
//!
//! A failing step aborts the procedure, the partially built environment stays on disk.
use std::{path::PathBuf, process::ExitStatus};

use log::debug;

use crate::{
    env::{Environment, EnvironmentCreator},
    error::{Error, ErrorExt, ErrorType, Throwable},
    files::pipconf::PipConfig,
    request::{EnvironmentRequest, MissingInstallerPolicy},
    tools::{
        announce::Announcer,
        runner::{Invocation, ProcessRunner},
    },
    util::{download::ScriptFetcher, fs::PathUtil},
};

/// The module name of the installer
pub static INSTALLER: &str = "pip";

/// The state of the installer after the availability check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallerState {
    /// The installer was already present
    Present,
    /// The installer was installed using the bootstrap script
    Bootstrapped,
    /// The installer is missing, optional steps have been skipped
    Missing,
}

/// The outcome of a successful provisioning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    /// The root of the provisioned environment
    pub env_dir: PathBuf,
    /// The state of the installer
    pub installer: InstallerState,
    /// Whether the host package has been removed again
    pub removed_host: bool,
}

/// The `EnvBuilder` tool, driving the provisioning of one environment
pub struct EnvBuilder<'a> {
    request: &'a EnvironmentRequest,
    creator: &'a dyn EnvironmentCreator,
    announcer: &'a dyn Announcer,
    runner: ProcessRunner<'a>,
}

impl<'a> EnvBuilder<'a> {
    /// Creates a new builder for `request`
    /// # Arguments
    /// * `request` - The environment to build
    /// * `creator` - The primitive creating the environment's skeleton
    /// * `fetcher` - The fetcher for a remote bootstrap script
    /// * `announcer` - The sink for progress messages
    pub fn new(
        request: &'a EnvironmentRequest,
        creator: &'a dyn EnvironmentCreator,
        fetcher: &'a dyn ScriptFetcher,
        announcer: &'a dyn Announcer,
    ) -> Self {
        Self {
            request,
            creator,
            announcer,
            runner: ProcessRunner::new(announcer, fetcher, request.verbose()),
        }
    }

    /// Executes the whole provisioning procedure
    /// # Returns
    /// A report about the provisioned environment
    pub fn create(&self) -> Result<ProvisionReport, Error> {
        let target = self.request.target_path();
        let context = || format!("Provisioning environment at {}", target.str_lossy());

        let environment = self
            .creator
            .create(target, &self.request.create_options())
            .e_context(context)?;

        self.post_setup(environment.as_ref()).e_context(context)
    }

    /// Sets up the installer and the packages in a freshly created environment
    fn post_setup(&self, environment: &dyn Environment) -> Result<ProvisionReport, Error> {
        let env_dir = environment.context().env_dir.clone();

        // The installer has to find its configuration on its first run
        let config_path = PipConfig::for_environment(&env_dir).write(&env_dir)?;
        debug!("Wrote installer configuration to {}", config_path.str_lossy());

        let install_args = self.install_args();
        let installer = self.ensure_installer(environment, &install_args)?;

        let mut pip_install = vec!["install".to_owned()];
        pip_install.extend(install_args);
        if self.request.use_legacy_resolver() {
            pip_install.push("--use-deprecated=legacy-resolver".to_owned());
        }

        let prerequisites = self.request.setup_prerequisites();
        if !prerequisites.is_empty() {
            if installer == InstallerState::Missing {
                self.announcer
                    .announce("Skipping installation of setup requires without pip");
            } else {
                let mut args = pip_install.clone();
                args.extend(prerequisites.iter().cloned());
                self.run_in_project(environment, args, "installation of setup requires")?;
            }
        }

        if self.request.editable_install() {
            pip_install.push("-e".to_owned());
        }
        pip_install.push(self.request.install_target());
        self.run_in_project(
            environment,
            pip_install,
            "installation of package dependencies",
        )?;

        let mut removed_host = false;
        if self.request.remove_host_package() {
            if installer == InstallerState::Missing {
                self.announcer
                    .announce("Skipping removal of main package without pip");
            } else {
                let mut args = vec!["uninstall".to_owned(), "--yes".to_owned()];
                if !self.request.verbose() {
                    args.push("-q".to_owned());
                }
                args.push(self.request.host_package_name().to_owned());
                self.run_in_project(environment, args, "removal of main package")?;
                removed_host = true;
            }
        }

        Ok(ProvisionReport {
            env_dir,
            installer,
            removed_host,
        })
    }

    /// Checks for the installer, falling back to the bootstrap script or the missing-installer policy
    fn ensure_installer(
        &self,
        environment: &dyn Environment,
        install_args: &[String],
    ) -> Result<InstallerState, Error> {
        self.announcer
            .announce("Checking if pip is already installed...");

        let check = Invocation::module(INSTALLER, vec!["-qqq".to_owned(), "check".to_owned()]);
        match self.runner.run(environment, &check) {
            Ok(()) => {
                self.announcer.announce("pip installed");
                return Ok(InstallerState::Present);
            }
            // Only a failing check is expected here, anything else is fatal
            Err(e) if e.as_env_error().is_some() => {
                debug!("Installer check failed: {}", e.error);
            }
            Err(e) => return Err(e),
        }

        match self.request.bootstrap().location() {
            Some(url) => {
                let bootstrap = Invocation::script("get-pip", url, install_args.to_vec())
                    .message("get-pip.py to install pip");
                self.runner.run(environment, &bootstrap)?;
                Ok(InstallerState::Bootstrapped)
            }
            None => match self.request.missing_installer() {
                MissingInstallerPolicy::Continue => {
                    self.announcer.announce("pip won't be installed");
                    Ok(InstallerState::Missing)
                }
                MissingInstallerPolicy::Abort => Err(EnvError::InstallerMissing
                    .throw("Ensuring the installer is available".to_owned())),
            },
        }
    }

    /// Runs the installer with `args` in the project root
    fn run_in_project(
        &self,
        environment: &dyn Environment,
        args: Vec<String>,
        message: &str,
    ) -> Result<(), Error> {
        let invocation = Invocation::module(INSTALLER, args)
            .cwd(self.request.project_root())
            .message(message);
        self.runner.run(environment, &invocation)
    }

    /// The flags common to all installations
    fn install_args(&self) -> Vec<String> {
        let mut args = vec!["--upgrade".to_owned(), "--no-cache-dir".to_owned()];
        if !self.request.verbose() {
            args.extend(["--quiet", "--progress-bar", "off"].map(str::to_owned));
        }
        args
    }
}

/// An error that originated from provisioning an environment
#[derive(Debug)]
pub enum EnvError {
    /// An invoked module or script exited unsuccessfully
    CommandFailed {
        command: String,
        args: Vec<String>,
        status: ExitStatus,
    },
    /// The installer is missing and there is no way to get it
    InstallerMissing,
}

impl<T> ErrorExt<T> for Result<T, EnvError> {
    fn e_context<F: Fn() -> String>(self, context: F) -> Result<T, Error> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(Error::new_context(ErrorType::Env(e), context())),
        }
    }
}

impl Throwable for EnvError {
    fn throw(self, context: String) -> Error {
        Error::new_context(ErrorType::Env(self), context)
    }
}

impl std::fmt::Display for EnvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CommandFailed {
                command,
                args,
                status,
            } => write!(
                f,
                "Failed to execute {} with arguments {:?} ({})",
                command, args, status
            ),
            Self::InstallerMissing => {
                write!(f, "pip is not installed and no get-pip.py source is configured")
            }
        }
    }
}
