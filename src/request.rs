//! The description of an environment to provision

use std::{path::PathBuf, str::FromStr};

use serde::Deserialize;

use crate::{
    env::CreateOptions,
    error::{Error, PreconditionError, Throwable},
    DEFAULT_GET_PIP_URL,
};

/// Where to get the script that bootstraps the installer from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BootstrapSource {
    /// Use [DEFAULT_GET_PIP_URL]
    #[default]
    Default,
    /// A URL or a local path to the bootstrap script
    Url(String),
    /// Never bootstrap the installer
    Disabled,
}

impl BootstrapSource {
    /// The location of the bootstrap script, `None` if bootstrapping is disabled
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Default => Some(DEFAULT_GET_PIP_URL),
            Self::Url(url) => Some(url),
            Self::Disabled => None,
        }
    }
}

/// What to do if the installer is missing and cannot be bootstrapped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingInstallerPolicy {
    /// Carry on without an installer, skipping the optional steps
    #[default]
    Continue,
    /// Fail the whole procedure
    Abort,
}

impl FromStr for MissingInstallerPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "continue" => Ok(Self::Continue),
            "abort" => Ok(Self::Abort),
            _ => Err(format!(
                "Unknown policy '{s}', expected 'continue' or 'abort'"
            )),
        }
    }
}

impl std::fmt::Display for MissingInstallerPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Continue => write!(f, "continue"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

/// A template struct that can be used to instantiate `EnvironmentRequest`s
#[derive(Debug, Clone, Default)]
pub struct RequestTemplate {
    /// The name of the project's own package
    pub host_package_name: String,
    /// The label of the environment, shown in its prompt
    pub environment_label: String,
    /// The directory containing the project descriptor
    pub project_root: PathBuf,
    /// The directory to create the environment in
    pub target_path: PathBuf,
    /// Whether to uninstall the host package once its dependencies are installed
    pub remove_host_package: bool,
    /// Where to bootstrap the installer from
    pub bootstrap: BootstrapSource,
    /// Whether to install the project in editable mode
    pub editable_install: bool,
    /// The extras to install, in order
    pub extras: Vec<String>,
    /// Requirements to install before the project itself
    pub setup_prerequisites: Vec<String>,
    /// Whether to let the tools talk
    pub verbose: bool,
    /// Whether the system site-packages are visible in the environment
    pub expose_system_packages: bool,
    /// Whether to force the installer's legacy resolver
    pub use_legacy_resolver: bool,
    /// What to do if the installer is absent and cannot be bootstrapped
    pub missing_installer: MissingInstallerPolicy,
}

/// The immutable request to provision one environment
#[derive(Debug, Clone)]
pub struct EnvironmentRequest {
    host_package_name: String,
    environment_label: String,
    project_root: PathBuf,
    target_path: PathBuf,
    remove_host_package: bool,
    bootstrap: BootstrapSource,
    editable_install: bool,
    extras: Vec<String>,
    setup_prerequisites: Vec<String>,
    verbose: bool,
    expose_system_packages: bool,
    use_legacy_resolver: bool,
    missing_installer: MissingInstallerPolicy,
}

impl EnvironmentRequest {
    /// Create a request from the provided template, checking its preconditions
    ///
    /// An editable install always keeps the host package, regardless of `remove_host_package`.
    /// # Errors
    /// - `PreconditionError::MissingEnvironmentLabel` if the label is empty
    /// - `PreconditionError::InvalidBootstrapSource` if the bootstrap URL is empty
    pub fn from_template(template: RequestTemplate) -> Result<Self, Error> {
        let context = || "Validating environment request".to_owned();

        if template.environment_label.trim().is_empty() {
            return Err(PreconditionError::MissingEnvironmentLabel.throw(context()));
        }

        if let BootstrapSource::Url(url) = &template.bootstrap {
            if url.trim().is_empty() {
                return Err(PreconditionError::InvalidBootstrapSource.throw(context()));
            }
        }

        Ok(Self {
            remove_host_package: template.remove_host_package && !template.editable_install,
            host_package_name: template.host_package_name,
            environment_label: template.environment_label,
            project_root: template.project_root,
            target_path: template.target_path,
            bootstrap: template.bootstrap,
            editable_install: template.editable_install,
            extras: template.extras,
            setup_prerequisites: template.setup_prerequisites,
            verbose: template.verbose,
            expose_system_packages: template.expose_system_packages,
            use_legacy_resolver: template.use_legacy_resolver,
            missing_installer: template.missing_installer,
        })
    }

    pub fn host_package_name(&self) -> &str {
        &self.host_package_name
    }

    pub fn environment_label(&self) -> &str {
        &self.environment_label
    }

    pub fn project_root(&self) -> &PathBuf {
        &self.project_root
    }

    pub fn target_path(&self) -> &PathBuf {
        &self.target_path
    }

    /// The effective removal flag, never `true` for editable installs
    pub fn remove_host_package(&self) -> bool {
        self.remove_host_package
    }

    pub fn bootstrap(&self) -> &BootstrapSource {
        &self.bootstrap
    }

    pub fn editable_install(&self) -> bool {
        self.editable_install
    }

    pub fn extras(&self) -> &[String] {
        &self.extras
    }

    pub fn setup_prerequisites(&self) -> &[String] {
        &self.setup_prerequisites
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn expose_system_packages(&self) -> bool {
        self.expose_system_packages
    }

    pub fn use_legacy_resolver(&self) -> bool {
        self.use_legacy_resolver
    }

    pub fn missing_installer(&self) -> MissingInstallerPolicy {
        self.missing_installer
    }

    /// The prompt text of the environment: `[venv: <label>] `
    pub fn prompt(&self) -> String {
        format!("[venv: {}] ", self.environment_label)
    }

    /// The project reference handed to the installer: `.` or `.[extra1,extra2]`
    pub fn install_target(&self) -> String {
        if self.extras.is_empty() {
            ".".to_owned()
        } else {
            format!(".[{}]", self.extras.join(","))
        }
    }

    /// The options for the environment creation primitive
    pub fn create_options(&self) -> CreateOptions {
        CreateOptions {
            label: self.environment_label.clone(),
            prompt: self.prompt(),
            system_site_packages: self.expose_system_packages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;

    fn template() -> RequestTemplate {
        RequestTemplate {
            host_package_name: "demo".to_owned(),
            environment_label: "demo".to_owned(),
            project_root: PathBuf::from("/src/demo"),
            target_path: PathBuf::from("/src/demo/.venv"),
            ..Default::default()
        }
    }

    #[test]
    fn editable_never_removes_host_package() {
        for requested in [true, false] {
            let request = EnvironmentRequest::from_template(RequestTemplate {
                remove_host_package: requested,
                editable_install: true,
                ..template()
            })
            .unwrap();
            assert!(!request.remove_host_package());
        }

        let request = EnvironmentRequest::from_template(RequestTemplate {
            remove_host_package: true,
            ..template()
        })
        .unwrap();
        assert!(request.remove_host_package());
    }

    #[test]
    fn install_target_renders_extras_in_order() {
        let request = EnvironmentRequest::from_template(template()).unwrap();
        assert_eq!(request.install_target(), ".");

        let request = EnvironmentRequest::from_template(RequestTemplate {
            extras: vec!["test".to_owned()],
            ..template()
        })
        .unwrap();
        assert_eq!(request.install_target(), ".[test]");

        let request = EnvironmentRequest::from_template(RequestTemplate {
            extras: vec!["test".to_owned(), "docs".to_owned(), "aio".to_owned()],
            ..template()
        })
        .unwrap();
        assert_eq!(request.install_target(), ".[test,docs,aio]");
    }

    #[test]
    fn empty_label_is_a_precondition_violation() {
        let err = EnvironmentRequest::from_template(RequestTemplate {
            environment_label: "  ".to_owned(),
            ..template()
        })
        .unwrap_err();

        assert!(matches!(
            err.error,
            ErrorType::Precondition(PreconditionError::MissingEnvironmentLabel)
        ));
    }

    #[test]
    fn empty_bootstrap_url_is_a_precondition_violation() {
        let err = EnvironmentRequest::from_template(RequestTemplate {
            bootstrap: BootstrapSource::Url(String::new()),
            ..template()
        })
        .unwrap_err();

        assert!(matches!(
            err.error,
            ErrorType::Precondition(PreconditionError::InvalidBootstrapSource)
        ));
    }

    #[test]
    fn bootstrap_locations() {
        assert_eq!(BootstrapSource::Default.location(), Some(DEFAULT_GET_PIP_URL));
        assert_eq!(
            BootstrapSource::Url("./get-pip.py".to_owned()).location(),
            Some("./get-pip.py")
        );
        assert_eq!(BootstrapSource::Disabled.location(), None);
    }

    #[test]
    fn prompt_and_policy_parsing() {
        let request = EnvironmentRequest::from_template(template()).unwrap();
        assert_eq!(request.prompt(), "[venv: demo] ");

        assert_eq!(
            "Abort".parse::<MissingInstallerPolicy>(),
            Ok(MissingInstallerPolicy::Abort)
        );
        assert!("sometimes".parse::<MissingInstallerPolicy>().is_err());
    }
}
