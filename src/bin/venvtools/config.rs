use std::path::{Path, PathBuf};

use venvtools::{
    files::pyproject::VenvToolsTable,
    request::{BootstrapSource, MissingInstallerPolicy},
    util::string::split_list,
    DEFAULT_ENV_PATH,
};

use crate::cli::CreateCommand;

/// The interpreter used for creating environments if none is configured
#[cfg(windows)]
const DEFAULT_PYTHON: &str = "python";
#[cfg(not(windows))]
const DEFAULT_PYTHON: &str = "python3";

/// The settings for creating an environment, merged from
/// the defaults, the project's `[tool.venvtools]` table and the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub path: PathBuf,
    pub env_name: String,
    pub bootstrap: BootstrapSource,
    pub extras: Vec<String>,
    pub system_site_packages: bool,
    pub editable: bool,
    pub old_resolver: bool,
    pub python: PathBuf,
    pub missing_installer: MissingInstallerPolicy,
}

impl Settings {
    /// Merges the settings, the command line wins over the project's table
    /// # Arguments
    /// * `project_name` - The name of the project, the default environment name
    /// * `table` - The project's `[tool.venvtools]` table
    /// * `path` - The `--path` argument
    /// * `command` - The `create` command's arguments
    pub fn resolve(
        project_name: &str,
        table: &VenvToolsTable,
        path: Option<&Path>,
        command: &CreateCommand,
    ) -> Self {
        let bootstrap = if command.no_get_pip {
            BootstrapSource::Disabled
        } else if let Some(url) = &command.get_pip {
            BootstrapSource::Url(url.clone())
        } else if table.no_get_pip == Some(true) {
            BootstrapSource::Disabled
        } else if let Some(url) = &table.get_pip {
            BootstrapSource::Url(url.clone())
        } else {
            BootstrapSource::Default
        };

        let extras = match (&command.extras, &table.extras) {
            (Some(extras), _) => split_list(extras),
            (None, Some(extras)) => extras.to_vec(),
            (None, None) => Vec::new(),
        };

        Self {
            path: path
                .map(Path::to_path_buf)
                .or_else(|| table.path.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_PATH)),
            env_name: command
                .env_name
                .clone()
                .or_else(|| table.env_name.clone())
                .unwrap_or_else(|| project_name.to_owned()),
            bootstrap,
            extras,
            system_site_packages: command.system_site_packages
                || table.system_site_packages.unwrap_or(false),
            editable: command.editable || table.editable.unwrap_or(false),
            old_resolver: command.old_resolver || table.old_resolver.unwrap_or(false),
            python: command
                .python
                .clone()
                .or_else(|| table.python.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PYTHON)),
            missing_installer: command
                .missing_installer
                .or(table.missing_installer)
                .unwrap_or_default(),
        }
    }
}
