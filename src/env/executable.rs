use std::{
    collections::HashMap,
    ffi::OsString,
    path::{Path, PathBuf},
};

use crate::env::EnvironmentExecutable;

/// What the interpreter should run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PythonTarget {
    /// Run a module (`-m <module>`)
    Module(String),
    /// Run a script file by its path
    Script(PathBuf),
    /// Run a script streamed through standard input (`-`)
    Stdin(Vec<u8>),
}

/// An invocation of the environment's interpreter
#[derive(Debug, Clone)]
pub struct PythonExecutable {
    /// The name for identifying the executable
    pub name: String,
    /// What to run
    pub target: PythonTarget,
    /// The arguments following the target
    pub args: Vec<String>,
    /// The working directory, `None` for the environment's default
    pub workdir: Option<PathBuf>,
    /// Additional environment variables
    pub env_vars: HashMap<String, String>,
}

impl PythonExecutable {
    /// Creates a new executable running `target` with `args`
    /// # Arguments
    /// * `name` - The name of the executable
    /// * `target` - What the interpreter should run
    /// * `args` - The arguments to pass after the target
    pub fn new(name: String, target: PythonTarget, args: Vec<String>) -> Self {
        Self {
            name,
            target,
            args,
            workdir: None,
            env_vars: HashMap::new(),
        }
    }
}

impl EnvironmentExecutable for PythonExecutable {
    fn get_name(&self) -> String {
        self.name.clone()
    }

    fn get_env_variables(&self) -> HashMap<String, String> {
        self.env_vars.clone()
    }

    fn get_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = match &self.target {
            PythonTarget::Module(module) => vec!["-m".into(), module.into()],
            PythonTarget::Script(path) => vec![path.into()],
            PythonTarget::Stdin(_) => vec!["-".into()],
        };
        args.extend(self.args.iter().map(OsString::from));
        args
    }

    fn get_workdir(&self) -> Option<&Path> {
        self.workdir.as_deref()
    }

    fn get_stdin(&self) -> Option<&[u8]> {
        match &self.target {
            PythonTarget::Stdin(data) => Some(data),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(exe: &PythonExecutable) -> Vec<String> {
        exe.get_args()
            .into_iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn module_target_uses_dash_m() {
        let exe = PythonExecutable::new(
            "pip".to_owned(),
            PythonTarget::Module("pip".to_owned()),
            vec!["-qqq".to_owned(), "check".to_owned()],
        );
        assert_eq!(args(&exe), vec!["-m", "pip", "-qqq", "check"]);
        assert!(exe.get_stdin().is_none());
    }

    #[test]
    fn script_target_passes_path() {
        let exe = PythonExecutable::new(
            "get-pip".to_owned(),
            PythonTarget::Script(PathBuf::from("/tmp/get-pip.py")),
            vec!["--upgrade".to_owned()],
        );
        assert_eq!(args(&exe), vec!["/tmp/get-pip.py", "--upgrade"]);
        assert!(exe.get_stdin().is_none());
    }

    #[test]
    fn stdin_target_streams_bytes() {
        let exe = PythonExecutable::new(
            "get-pip".to_owned(),
            PythonTarget::Stdin(b"print('hi')".to_vec()),
            vec![],
        );
        assert_eq!(args(&exe), vec!["-"]);
        assert_eq!(exe.get_stdin(), Some(&b"print('hi')"[..]));
    }
}
