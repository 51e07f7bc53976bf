//! The per-environment configuration file of the installer

use std::path::{Path, PathBuf};

use crate::{
    error::{Error, ErrorExt},
    util::fs::{write_file, PathUtil},
};

/// The installer configuration pinning all installs to one environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipConfig {
    /// Refuse to install outside a virtual environment (`[global] require-virtualenv`)
    pub require_virtualenv: bool,
    /// Install into the user scheme (`[install] user`)
    pub user: bool,
    /// The installation prefix (`[install] prefix`)
    pub prefix: PathBuf,
}

impl PipConfig {
    /// The configuration for the environment rooted at `env_dir`
    pub fn for_environment(env_dir: &Path) -> Self {
        Self {
            require_virtualenv: true,
            user: false,
            prefix: env_dir.to_path_buf(),
        }
    }

    /// The name the installer expects its environment configuration under:
    /// `pip.ini` on Windows, `pip.conf` elsewhere
    pub fn file_name() -> &'static str {
        if cfg!(windows) {
            "pip.ini"
        } else {
            "pip.conf"
        }
    }

    /// Renders the configuration in INI format
    pub fn render(&self) -> String {
        format!(
            "[global]\nrequire-virtualenv = {}\n\n[install]\nuser = {}\nprefix = {}\n\n",
            ini_bool(self.require_virtualenv),
            ini_bool(self.user),
            self.prefix.str_lossy()
        )
    }

    /// Writes the configuration into `env_dir`, replacing an existing one
    /// # Returns
    /// The path to the written file
    pub fn write(&self, env_dir: &Path) -> Result<PathBuf, Error> {
        let path = env_dir.join(Self::file_name());
        write_file(&path, &self.render())
            .e_context(|| format!("Writing installer configuration to {}", env_dir.str_lossy()))?;
        Ok(path)
    }
}

fn ini_bool(value: bool) -> &'static str {
    match value {
        true => "True",
        false => "False",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_ini_sections() {
        let config = PipConfig::for_environment(Path::new("/p/.venv"));

        assert_eq!(
            config.render(),
            "[global]\nrequire-virtualenv = True\n\n[install]\nuser = False\nprefix = /p/.venv\n\n"
        );
    }

    #[test]
    fn writes_platform_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = PipConfig::for_environment(dir.path()).write(dir.path()).unwrap();

        assert_eq!(path.file_name().unwrap(), PipConfig::file_name());
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains(&format!("prefix = {}", dir.path().to_string_lossy())));
    }
}
