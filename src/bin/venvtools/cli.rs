use std::path::PathBuf;

use clap::{Parser, Subcommand};
use venvtools::{
    error::{Error, ErrorExt},
    files::pyproject::{PyprojectFile, PYPROJECT_FILE},
    util::{fs::PathUtil, parse::parse_toml},
    DEFAULT_ENV_PATH,
};

mod create;
pub use create::*;

mod location;
pub use location::*;

mod remove;
pub use remove::*;

/// Build development virtual environments for Python projects
#[derive(Parser)]
#[command(name = "venvtools", version)]
pub struct Cli {
    /// The loglevel to operate on (0 = info, 1 = debug, * = trace)
    #[arg(long = "loglevel", short = 'v', default_value_t = 0, global = true)]
    pub loglevel: u8,

    /// The project directory containing pyproject.toml
    #[arg(long, short = 'p', default_value = ".", global = true)]
    pub project: PathBuf,

    /// Path of the virtual environment, relative to the project [.venv]
    #[arg(long, global = true)]
    pub path: Option<PathBuf>,

    #[command(subcommand)]
    command: VenvCommand,
}

#[derive(Subcommand)]
pub enum VenvCommand {
    /// Create the virtual environment and install the project's dependencies
    Create(CreateCommand),
    /// Remove the virtual environment
    Remove(RemoveCommand),
    /// Print the location of the virtual environment
    Location(LocationCommand),
}

impl Cli {
    pub fn run(&self) -> Result<i32, Error> {
        if std::env::var("RUST_LOG").is_err() {
            match &self.loglevel {
                0 => std::env::set_var("RUST_LOG", "info"),
                1 => std::env::set_var("RUST_LOG", "debug"),
                _ => std::env::set_var("RUST_LOG", "trace"),
            }
        }
        pretty_env_logger::init();

        self.command.run(self)
    }

    /// Whether the provisioning tools should talk
    pub fn verbose(&self) -> bool {
        self.loglevel >= 1
    }

    /// The absolute project root
    pub fn project_root(&self) -> Result<PathBuf, Error> {
        self.project
            .canonicalize()
            .e_context(|| format!("Resolving project directory {}", self.project.str_lossy()))
    }

    /// The environment path when no project metadata is needed:
    /// `--path`, else `tool.venvtools.path` if there is a descriptor, else the default
    pub fn env_path(&self) -> Result<PathBuf, Error> {
        let root = self.project_root()?;

        let path = match &self.path {
            Some(path) => path.clone(),
            None => {
                let descriptor = root.join(PYPROJECT_FILE);
                let configured = if descriptor.is_file() {
                    let file: PyprojectFile = parse_toml(&descriptor)?;
                    file.tool.venvtools.and_then(|t| t.path)
                } else {
                    None
                };
                configured.unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_PATH))
            }
        };

        Ok(root.join(path))
    }
}

impl VenvCommand {
    pub fn run(&self, cli: &Cli) -> Result<i32, Error> {
        match self {
            Self::Create(cmd) => cmd.run(cli),
            Self::Remove(cmd) => cmd.run(cli),
            Self::Location(cmd) => cmd.run(cli),
        }
    }
}
