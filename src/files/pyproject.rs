//! The data structures to parse from a project's `pyproject.toml`

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{request::MissingInstallerPolicy, util::parse::Requirement, util::string::split_list};

/// The name of the project descriptor file
pub static PYPROJECT_FILE: &str = "pyproject.toml";

/// The contents of a `pyproject.toml` file, as far as venvtools is concerned
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PyprojectFile {
    /// The `[project]` table
    pub project: Option<ProjectTable>,

    /// The `[build-system]` table
    #[serde(rename = "build-system")]
    pub build_system: Option<BuildSystemTable>,

    /// The `[tool]` table
    #[serde(default)]
    pub tool: ToolTable,
}

/// The `[project]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectTable {
    pub name: Option<String>,

    /// The requirements of the project
    #[serde(default)]
    pub dependencies: Vec<Requirement>,

    /// The extras of the project, in declaration order
    #[serde(default, rename = "optional-dependencies")]
    pub optional_dependencies: IndexMap<String, Vec<Requirement>>,

    /// Fields the build backend computes
    #[serde(default)]
    pub dynamic: Vec<String>,
}

/// The `[build-system]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildSystemTable {
    /// The requirements needed to build the project
    #[serde(default)]
    pub requires: Vec<String>,

    #[serde(rename = "build-backend")]
    pub build_backend: Option<String>,
}

/// The `[tool]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolTable {
    pub venvtools: Option<VenvToolsTable>,
    pub setuptools: Option<SetuptoolsTable>,
}

/// The `[tool.setuptools]` table
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetuptoolsTable {
    /// Legacy dependency links, which are rejected
    #[serde(default, rename = "dependency-links")]
    pub dependency_links: Vec<String>,
}

/// The `[tool.venvtools]` table, providing defaults for the command line
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct VenvToolsTable {
    pub path: Option<PathBuf>,
    pub env_name: Option<String>,
    pub get_pip: Option<String>,
    pub no_get_pip: Option<bool>,
    pub extras: Option<StringList>,
    pub system_site_packages: Option<bool>,
    pub editable: Option<bool>,
    pub old_resolver: Option<bool>,
    pub python: Option<PathBuf>,
    pub missing_installer: Option<MissingInstallerPolicy>,
}

/// A list that may be written as a TOML array or as one comma / newline separated string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringList {
    List(Vec<String>),
    Joined(String),
}

impl StringList {
    /// Returns the normalized entries of the list, see [split_list()]
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::List(list) => list.iter().flat_map(|s| split_list(s)).collect(),
            Self::Joined(joined) => split_list(joined),
        }
    }
}
