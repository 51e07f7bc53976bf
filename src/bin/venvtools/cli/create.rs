use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};
use venvtools::{
    env::VenvCreator,
    error::{Error, ErrorExt},
    project::Project,
    request::{EnvironmentRequest, MissingInstallerPolicy, RequestTemplate},
    tools::{
        announce::LogAnnouncer,
        envbuilder::{EnvBuilder, InstallerState},
    },
    util::{download::CurlFetcher, fs::PathUtil},
};

use super::Cli;
use crate::config::Settings;

/// The `create` command
#[derive(Parser)]
pub struct CreateCommand {
    /// Virtual environment name [project name]
    #[arg(long, short = 'n')]
    pub env_name: Option<String>,

    /// URL or path of get-pip.py [https://bootstrap.pypa.io/get-pip.py]
    #[arg(long, conflicts_with = "no_get_pip")]
    pub get_pip: Option<String>,

    /// Do not bootstrap pip if the environment lacks it
    #[arg(long)]
    pub no_get_pip: bool,

    /// Comma separated list of extras to be installed
    #[arg(long, short = 'e')]
    pub extras: Option<String>,

    /// Make the system (global) site-packages dir available to the created environment
    #[arg(long)]
    pub system_site_packages: bool,

    /// Install the package to the environment as editable
    #[arg(long)]
    pub editable: bool,

    /// Force pip to use its old resolver
    #[arg(long)]
    pub old_resolver: bool,

    /// The interpreter creating the environment [python3]
    #[arg(long)]
    pub python: Option<PathBuf>,

    /// What to do if pip is missing and cannot be bootstrapped (continue, abort) [continue]
    #[arg(long)]
    pub missing_installer: Option<MissingInstallerPolicy>,
}

impl CreateCommand {
    pub fn run(&self, cli: &Cli) -> Result<i32, Error> {
        let context = || "Creating virtual environment".to_owned();

        let root = cli.project_root()?;
        let project = Project::load(&root).e_context(context)?;
        let settings = Settings::resolve(
            &project.name,
            &project.settings,
            cli.path.as_deref(),
            self,
        );

        if project.dynamic_dependencies {
            warn!(
                "Dependencies of {} are dynamic, assuming it does not depend on itself",
                project.name
            );
        }
        let requires_itself = project
            .requires_itself(&settings.extras)
            .e_context(context)?;

        let request = EnvironmentRequest::from_template(RequestTemplate {
            host_package_name: project.name.clone(),
            environment_label: settings.env_name,
            project_root: root.clone(),
            target_path: root.join(&settings.path),
            remove_host_package: !requires_itself,
            bootstrap: settings.bootstrap,
            editable_install: settings.editable,
            extras: settings.extras,
            setup_prerequisites: project.build_requires.clone(),
            verbose: cli.verbose(),
            expose_system_packages: settings.system_site_packages,
            use_legacy_resolver: settings.old_resolver,
            missing_installer: settings.missing_installer,
        })
        .e_context(context)?;

        info!(
            "Creating virtual env at path: {}",
            request.target_path().str_lossy()
        );

        // Stale metadata would pin the old dependency set
        project.purge_egg_info().e_context(context)?;

        let creator = VenvCreator::new(settings.python);
        let fetcher = CurlFetcher::default();
        let announcer = LogAnnouncer::default();

        let report = EnvBuilder::new(&request, &creator, &fetcher, &announcer)
            .create()
            .e_context(context)?;

        if report.installer == InstallerState::Missing {
            warn!("pip is not available in {}", report.env_dir.str_lossy());
        }
        info!("Virtual env ready at {}", report.env_dir.str_lossy());

        Ok(0)
    }
}
