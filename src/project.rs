//! The project an environment is provisioned for

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::{
    error::{Error, ErrorExt, PreconditionError, Throwable},
    files::pyproject::{PyprojectFile, VenvToolsTable, PYPROJECT_FILE},
    util::{
        fs::{remove_dir_all, PathUtil},
        parse::{normalize_name, parse_toml, Requirement},
    },
};

/// Descriptor files of projects venvtools cannot read the metadata of
static LEGACY_DESCRIPTORS: [&str; 2] = ["setup.py", "setup.cfg"];

/// The metadata of a project, read from its `pyproject.toml`
#[derive(Debug, Clone)]
pub struct Project {
    /// The directory containing the descriptor
    pub root: PathBuf,
    /// The name of the project's package
    pub name: String,
    /// The base requirements
    pub dependencies: Vec<Requirement>,
    /// The extras, in declaration order
    pub optional_dependencies: Vec<(String, Vec<Requirement>)>,
    /// The requirements that have to be installed before the project can be built
    pub build_requires: Vec<String>,
    /// Whether the dependencies are computed by the build backend
    pub dynamic_dependencies: bool,
    /// The `[tool.venvtools]` settings
    pub settings: VenvToolsTable,
}

impl Project {
    /// Loads the project rooted at `root`
    /// # Errors
    /// - `PreconditionError::MissingDescriptor` if there is no `pyproject.toml`
    /// - `PreconditionError::MissingProjectName` if the descriptor does not name the project
    /// - `PreconditionError::DependencyLinks` if the project declares dependency links
    pub fn load(root: &Path) -> Result<Self, Error> {
        let context = || format!("Loading project at {}", root.str_lossy());

        let descriptor = root.join(PYPROJECT_FILE);
        if !descriptor.is_file() {
            for legacy in LEGACY_DESCRIPTORS {
                if root.join(legacy).is_file() {
                    debug!("Found {legacy}, but its metadata cannot be read without Python");
                }
            }
            return Err(PreconditionError::MissingDescriptor {
                root: root.to_path_buf(),
            }
            .throw(context()));
        }

        let file: PyprojectFile = parse_toml(&descriptor).e_context(context)?;
        Self::from_file(root, file).e_context(context)
    }

    /// Builds the project from an already parsed descriptor
    /// # Arguments
    /// * `root` - The directory the descriptor lives in
    /// * `file` - The parsed descriptor
    pub fn from_file(root: &Path, file: PyprojectFile) -> Result<Self, Error> {
        let context = || "Reading project metadata".to_owned();

        let has_links = file
            .tool
            .setuptools
            .as_ref()
            .map(|s| !s.dependency_links.is_empty())
            .unwrap_or(false);
        if has_links {
            return Err(PreconditionError::DependencyLinks.throw(context()));
        }

        let project = file.project.unwrap_or_default();
        let name = match project.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => {
                return Err(PreconditionError::MissingProjectName {
                    descriptor: root.join(PYPROJECT_FILE),
                }
                .throw(context()))
            }
        };

        Ok(Self {
            root: root.to_path_buf(),
            name,
            dependencies: project.dependencies,
            optional_dependencies: project.optional_dependencies.into_iter().collect(),
            build_requires: file.build_system.map(|b| b.requires).unwrap_or_default(),
            dynamic_dependencies: project.dynamic.iter().any(|d| d == "dependencies"),
            settings: file.tool.venvtools.unwrap_or_default(),
        })
    }

    /// Collects the base requirements and those of the selected `extras`
    /// # Errors
    /// `PreconditionError::UnknownExtra` if an extra is not declared
    pub fn requirements(&self, extras: &[String]) -> Result<Vec<&Requirement>, Error> {
        let mut requirements: Vec<&Requirement> = self.dependencies.iter().collect();

        for extra in extras {
            let normalized = normalize_name(extra);
            let found = self
                .optional_dependencies
                .iter()
                .find(|(name, _)| normalize_name(name) == normalized);

            match found {
                Some((_, reqs)) => requirements.extend(reqs.iter()),
                None => {
                    return Err(PreconditionError::UnknownExtra {
                        extra: extra.clone(),
                        available: self
                            .optional_dependencies
                            .iter()
                            .map(|(name, _)| name.clone())
                            .collect(),
                    }
                    .throw(format!("Selecting extras of {}", self.name)))
                }
            }
        }

        Ok(requirements)
    }

    /// Whether the selected requirements name the project itself,
    /// in which case removing it would break the environment
    pub fn requires_itself(&self, extras: &[String]) -> Result<bool, Error> {
        let own = normalize_name(&self.name);
        Ok(self
            .requirements(extras)?
            .iter()
            .any(|r| r.normalized_name() == own))
    }

    /// The locations setuptools caches the project's metadata at
    pub fn egg_info_paths(&self) -> Vec<PathBuf> {
        let dir_name = format!("{}.egg-info", self.name.replace('-', "_"));
        vec![
            self.root.join(&dir_name),
            self.root.join("src").join(&dir_name),
        ]
    }

    /// Removes cached egg-info metadata so the dependencies get recalculated
    /// # Returns
    /// The number of removed directories
    pub fn purge_egg_info(&self) -> Result<usize, Error> {
        let mut removed = 0;
        for path in self.egg_info_paths() {
            if path.is_dir() {
                info!("Removing cached metadata {}", path.str_lossy());
                remove_dir_all(&path)?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorType;

    fn project(toml: &str) -> Result<Project, Error> {
        let file: PyprojectFile = toml::from_str(toml).unwrap();
        Project::from_file(Path::new("/src/demo"), file)
    }

    const DEMO: &str = r#"
        [build-system]
        requires = ["setuptools>=61"]

        [project]
        name = "Demo_Pkg"
        dependencies = ["attrs"]

        [project.optional-dependencies]
        test = ["pytest"]
        all = ["demo-pkg[test]"]
    "#;

    #[test]
    fn reads_metadata() {
        let project = project(DEMO).unwrap();

        assert_eq!(project.name, "Demo_Pkg");
        assert_eq!(project.build_requires, vec!["setuptools>=61"]);
        assert_eq!(project.optional_dependencies[0].0, "test");
        assert!(!project.dynamic_dependencies);
    }

    #[test]
    fn detects_self_requirement_through_extras() {
        let project = project(DEMO).unwrap();

        assert!(!project.requires_itself(&[]).unwrap());
        assert!(!project.requires_itself(&["test".to_owned()]).unwrap());
        assert!(project.requires_itself(&["all".to_owned()]).unwrap());
    }

    #[test]
    fn unknown_extra_is_rejected() {
        let err = project(DEMO)
            .unwrap()
            .requirements(&["docs".to_owned()])
            .unwrap_err();

        match err.error {
            ErrorType::Precondition(PreconditionError::UnknownExtra { extra, available }) => {
                assert_eq!(extra, "docs");
                assert_eq!(available, vec!["test", "all"]);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn dependency_links_are_rejected() {
        let err = project(
            r#"
            [project]
            name = "demo"

            [tool.setuptools]
            dependency-links = ["https://example.invalid/pkgs"]
            "#,
        )
        .unwrap_err();

        assert!(matches!(
            err.error,
            ErrorType::Precondition(PreconditionError::DependencyLinks)
        ));
    }

    #[test]
    fn missing_name_is_rejected() {
        let err = project("[build-system]\nrequires = []\n").unwrap_err();
        assert!(matches!(
            err.error,
            ErrorType::Precondition(PreconditionError::MissingProjectName { .. })
        ));
    }

    #[test]
    fn load_requires_pyproject() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("setup.py"), "from setuptools import setup\n").unwrap();

        let err = Project::load(dir.path()).unwrap_err();
        assert!(matches!(
            err.error,
            ErrorType::Precondition(PreconditionError::MissingDescriptor { .. })
        ));
    }

    #[test]
    fn purges_egg_info_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(PYPROJECT_FILE),
            "[project]\nname = \"demo-pkg\"\n",
        )
        .unwrap();
        std::fs::create_dir_all(dir.path().join("demo_pkg.egg-info")).unwrap();
        std::fs::create_dir_all(dir.path().join("src").join("demo_pkg.egg-info")).unwrap();

        let project = Project::load(dir.path()).unwrap();
        assert_eq!(project.purge_egg_info().unwrap(), 2);
        assert!(!dir.path().join("demo_pkg.egg-info").exists());
        assert_eq!(project.purge_egg_info().unwrap(), 0);
    }
}
