use std::{
    io::Write,
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
};

use log::{debug, trace};

use crate::{
    error::{Error, ErrorExt, Throwable},
    tools::envbuilder::EnvError,
    util::fs::{write_file, PathUtil},
};

use super::{CreateOptions, EnvContext, Environment, EnvironmentCreator, EnvironmentExecutable};

/// A virtual environment created by the `venv` module of a Python interpreter
///
/// Every executable runs through the environment's own interpreter in isolated mode
/// (`-I -q`), with `VIRTUAL_ENV` pointing at the environment root.
pub struct VirtualEnvironment {
    context: EnvContext,
}

impl VirtualEnvironment {
    /// Wraps an existing environment described by `context`
    pub fn new(context: EnvContext) -> Self {
        Self { context }
    }
}

impl Environment for VirtualEnvironment {
    fn context(&self) -> &EnvContext {
        &self.context
    }

    fn execute(&self, executable: &dyn EnvironmentExecutable) -> Result<ExitStatus, Error> {
        let context = || {
            format!(
                "Executing '{}' in {}",
                executable.get_name(),
                self.context.env_dir.str_lossy()
            )
        };

        let mut command = Command::new(&self.context.env_exe);

        command
            .arg("-I")
            .arg("-q")
            .args(executable.get_args())
            .current_dir(executable.get_workdir().unwrap_or(&self.context.bin_path))
            .env("VIRTUAL_ENV", &self.context.env_dir)
            .envs(executable.get_env_variables());

        debug!(
            "Running '{}', executing '{}' with following arguments:",
            executable.get_name(),
            self.context.env_exe.str_lossy()
        );
        for arg in command.get_args() {
            debug!(" - {}", arg.to_string_lossy());
        }

        debug!("Following environment variables:");
        for env in command.get_envs() {
            if let Some(value) = env.1 {
                debug!(
                    " - {} = '{}'",
                    env.0.to_string_lossy(),
                    value.to_string_lossy()
                )
            } else {
                debug!(" - {}", env.0.to_string_lossy(),)
            }
        }

        let stdin = executable.get_stdin();
        if stdin.is_some() {
            command.stdin(Stdio::piped());
        }

        let mut child = command.spawn().e_context(context)?;

        let write_res = match (stdin, child.stdin.take()) {
            (Some(data), Some(mut pipe)) => {
                trace!("Feeding {} bytes to standard input", data.len());
                pipe.write_all(data)
            }
            _ => Ok(()),
        };

        let status = child.wait().e_context(context)?;
        debug!("Command exited with {}", status);

        // A child that exits early closes its end of the pipe, its status tells the story
        if let Err(e) = write_res {
            if status.success() && e.kind() != std::io::ErrorKind::BrokenPipe {
                return Err(e.throw(context()));
            }
            debug!("Writing standard input failed: {e}");
        }

        Ok(status)
    }
}

/// Creates environments using `<python> -m venv`
pub struct VenvCreator {
    /// The interpreter whose `venv` module creates the environment
    pub python: PathBuf,
}

impl VenvCreator {
    /// Creates a new creator using the supplied interpreter
    pub fn new(python: PathBuf) -> Self {
        Self { python }
    }

    /// The arguments passed to the interpreter for creating an environment at `target`
    fn venv_args(target: &Path, options: &CreateOptions) -> Vec<String> {
        let mut args = vec!["-m".to_owned(), "venv".to_owned(), "--without-pip".to_owned()];

        if !cfg!(windows) {
            args.push("--symlinks".to_owned());
        }

        if options.system_site_packages {
            args.push("--system-site-packages".to_owned());
        }

        args.push("--prompt".to_owned());
        args.push(options.label.clone());
        args.push(target.str_lossy());

        args
    }
}

impl EnvironmentCreator for VenvCreator {
    fn create(
        &self,
        target: &Path,
        options: &CreateOptions,
    ) -> Result<Box<dyn Environment>, Error> {
        let context = || format!("Creating virtual environment at {}", target.str_lossy());

        let args = Self::venv_args(target, options);
        debug!(
            "Executing '{}' with arguments {:?}",
            self.python.str_lossy(),
            args
        );

        let status = Command::new(&self.python)
            .args(&args)
            .status()
            .e_context(context)?;

        if !status.success() {
            return Err(EnvError::CommandFailed {
                command: "venv".to_owned(),
                args,
                status,
            }
            .throw(context()));
        }

        let env_context = EnvContext::new(target.to_path_buf(), options.prompt.clone());
        replace_default_prompt(&env_context, &options.label).e_context(context)?;

        Ok(Box::new(VirtualEnvironment::new(env_context)))
    }
}

/// Wrappers newer `venv` versions put around the bare label when building the prompt,
/// paired with their unwrapped form
static PROMPT_WRAPPERS: [(&str, &str); 4] = [
    ("(${VIRTUAL_ENV_PROMPT}) ", "${VIRTUAL_ENV_PROMPT} "),
    ("($VIRTUAL_ENV_PROMPT) ", "$VIRTUAL_ENV_PROMPT "),
    ("(%VIRTUAL_ENV_PROMPT%) ", "%VIRTUAL_ENV_PROMPT% "),
    ("\"%s(%s)%s \"", "\"%s%s%s \""),
];

/// Replaces the default `(<label>) ` prompt the `venv` module writes into
/// the activation scripts with the prompt of `env_context`
///
/// Older `venv` versions embed the literal `(<label>) `, newer ones store the bare
/// label in `VIRTUAL_ENV_PROMPT` and wrap it in parentheses when building the prompt.
/// Both forms are rewritten. `Activate.ps1` reads the label from `pyvenv.cfg` and
/// keeps the default.
/// # Arguments
/// * `env_context` - The context of the environment to patch
/// * `label` - The label the environment was created with
/// # Returns
/// The number of scripts that were rewritten
pub fn replace_default_prompt(env_context: &EnvContext, label: &str) -> Result<usize, Error> {
    let default_prompt = format!("({label}) ");
    if default_prompt == env_context.prompt {
        return Ok(0);
    }

    let entries = std::fs::read_dir(&env_context.bin_path)
        .e_context(|| format!("Listing {}", env_context.bin_path.str_lossy()))?;

    let mut rewritten = 0;
    for entry in entries {
        let path = entry
            .e_context(|| format!("Listing {}", env_context.bin_path.str_lossy()))?
            .path();

        let is_activate = path
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase().starts_with("activate"))
            .unwrap_or(false);
        if !is_activate || !path.is_file() {
            continue;
        }

        // Binary or otherwise undecodable scripts are left alone
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };

        let patched = rewrite_prompt(&content, label, &env_context.prompt);
        if patched != content {
            write_file(&path, &patched)?;
            rewritten += 1;
        }
    }

    if rewritten == 0 {
        debug!(
            "No activation script in {} carries the default prompt",
            env_context.bin_path.str_lossy()
        );
    }

    Ok(rewritten)
}

/// Rewrites both prompt forms in the activation script `content`
fn rewrite_prompt(content: &str, label: &str, prompt: &str) -> String {
    let content = content.replace(&format!("({label}) "), prompt);

    // Nothing to unwrap if the script does not store the bare label
    let bare = [format!("\"{label}\""), format!("={label}\"")];
    let stores_label = content.lines().any(|l| {
        l.contains("VIRTUAL_ENV_PROMPT") && bare.iter().any(|b| l.contains(b.as_str()))
    });
    if !stores_label {
        return content;
    }

    let trimmed = prompt.trim_end();
    let mut content: String = content
        .split_inclusive('\n')
        .map(|line| {
            if !line.contains("VIRTUAL_ENV_PROMPT") {
                return line.to_owned();
            }
            line.replace(&bare[0], &format!("\"{trimmed}\""))
                .replace(&bare[1], &format!("={trimmed}\""))
        })
        .collect();

    for (wrapped, unwrapped) in PROMPT_WRAPPERS {
        content = content.replace(wrapped, unwrapped);
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{PythonExecutable, PythonTarget};

    fn options(system_site_packages: bool) -> CreateOptions {
        CreateOptions {
            label: "demo".to_owned(),
            prompt: "[venv: demo] ".to_owned(),
            system_site_packages,
        }
    }

    #[test]
    fn venv_args_disable_pip_and_set_prompt() {
        let args = VenvCreator::venv_args(Path::new("/p/.venv"), &options(true));

        assert_eq!(&args[..3], &["-m", "venv", "--without-pip"]);
        assert!(args.contains(&"--system-site-packages".to_owned()));
        assert_eq!(&args[args.len() - 3..], &["--prompt", "demo", "/p/.venv"]);

        let args = VenvCreator::venv_args(Path::new("/p/.venv"), &options(false));
        assert!(!args.contains(&"--system-site-packages".to_owned()));
    }

    #[test]
    fn rewrites_prompt_in_activation_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = EnvContext::new(dir.path().to_path_buf(), "[venv: demo] ".to_owned());
        std::fs::create_dir_all(&ctx.bin_path).unwrap();

        let activate = ctx.bin_path.join("activate");
        std::fs::write(&activate, "PS1=\"(demo) ${PS1:-}\"\n").unwrap();
        let fish = ctx.bin_path.join("activate.fish");
        std::fs::write(&fish, "printf \"%s%s\" \"(demo) \" (set_color normal)\n").unwrap();
        let other = ctx.bin_path.join("pip-notes.txt");
        std::fs::write(&other, "(demo) stays").unwrap();

        let rewritten = replace_default_prompt(&ctx, "demo").unwrap();

        assert_eq!(rewritten, 2);
        assert_eq!(
            std::fs::read_to_string(&activate).unwrap(),
            "PS1=\"[venv: demo] ${PS1:-}\"\n"
        );
        assert!(std::fs::read_to_string(&fish).unwrap().contains("[venv: demo] "));
        assert_eq!(std::fs::read_to_string(&other).unwrap(), "(demo) stays");
    }

    #[test]
    fn rewrites_bare_label_prompt_forms() {
        let prompt = "[venv: demo] ";

        let bash = "VIRTUAL_ENV_PROMPT=\"demo\"\nexport VIRTUAL_ENV_PROMPT\n\
                    PS1=\"(${VIRTUAL_ENV_PROMPT}) ${PS1:-}\"\n";
        assert_eq!(
            rewrite_prompt(bash, "demo", prompt),
            "VIRTUAL_ENV_PROMPT=\"[venv: demo]\"\nexport VIRTUAL_ENV_PROMPT\n\
             PS1=\"${VIRTUAL_ENV_PROMPT} ${PS1:-}\"\n"
        );

        let fish = "set -gx VIRTUAL_ENV_PROMPT \"demo\"\n\
                    printf \"%s(%s)%s \" (set_color 4B8BBE) $VIRTUAL_ENV_PROMPT (set_color normal)\n";
        assert_eq!(
            rewrite_prompt(fish, "demo", prompt),
            "set -gx VIRTUAL_ENV_PROMPT \"[venv: demo]\"\n\
             printf \"%s%s%s \" (set_color 4B8BBE) $VIRTUAL_ENV_PROMPT (set_color normal)\n"
        );

        let bat = "set \"VIRTUAL_ENV_PROMPT=demo\"\r\nset \"PROMPT=(%VIRTUAL_ENV_PROMPT%) %PROMPT%\"\r\n";
        assert_eq!(
            rewrite_prompt(bat, "demo", prompt),
            "set \"VIRTUAL_ENV_PROMPT=[venv: demo]\"\r\nset \"PROMPT=%VIRTUAL_ENV_PROMPT% %PROMPT%\"\r\n"
        );
    }

    #[test]
    fn legacy_prompt_variable_is_not_unwrapped_twice() {
        let script = "VIRTUAL_ENV_PROMPT=\"(demo) \"\nPS1=\"(demo) ${PS1:-}\"\n";
        assert_eq!(
            rewrite_prompt(script, "demo", "[venv: demo] "),
            "VIRTUAL_ENV_PROMPT=\"[venv: demo] \"\nPS1=\"[venv: demo] ${PS1:-}\"\n"
        );
    }

    #[test]
    fn unrelated_parentheses_survive() {
        let script = "deactivate () {\n    echo \"(demo) gone\"\n}\n";
        let patched = rewrite_prompt(script, "other", "[venv: other] ");
        assert_eq!(patched, script);
    }

    #[cfg(unix)]
    #[test]
    fn execute_runs_interpreter_isolated_with_stdin() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let ctx = EnvContext::new(dir.path().to_path_buf(), "[venv: demo] ".to_owned());
        std::fs::create_dir_all(&ctx.bin_path).unwrap();

        // A stand-in interpreter recording how it was called
        std::fs::write(
            &ctx.env_exe,
            "#!/bin/sh\necho \"$@\" > args.txt\necho \"$VIRTUAL_ENV\" > venv.txt\ncat > stdin.txt\nexit 3\n",
        )
        .unwrap();
        std::fs::set_permissions(&ctx.env_exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        let env = VirtualEnvironment::new(ctx.clone());
        let exe = PythonExecutable::new(
            "get-pip".to_owned(),
            PythonTarget::Stdin(b"print('pip')".to_vec()),
            vec!["--upgrade".to_owned()],
        );

        let status = env.execute(&exe).unwrap();

        assert_eq!(status.code(), Some(3));
        let read = |name: &str| std::fs::read_to_string(ctx.bin_path.join(name)).unwrap();
        assert_eq!(read("args.txt"), "-I -q - --upgrade\n");
        assert_eq!(read("venv.txt").trim_end(), dir.path().to_string_lossy());
        assert_eq!(read("stdin.txt"), "print('pip')");
    }
}
