//! Fakes for exercising the tools without a real interpreter or network

use std::{
    cell::{Cell, RefCell},
    path::{Path, PathBuf},
    process::ExitStatus,
    rc::Rc,
};

use crate::{
    env::{CreateOptions, EnvContext, Environment, EnvironmentCreator, EnvironmentExecutable},
    error::{Error, ErrorExt},
    tools::announce::Announcer,
    util::{
        download::{LimitedBuffer, ScriptFetcher, DOWNLOAD_LIMIT},
        fs::create_dir_all,
    },
};

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

#[derive(Default)]
pub struct RecordingAnnouncer {
    messages: RefCell<Vec<String>>,
}

impl RecordingAnnouncer {
    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }
}

impl Announcer for RecordingAnnouncer {
    fn announce(&self, message: &str) {
        self.messages.borrow_mut().push(message.to_owned());
    }
}

/// A recorded execution
#[derive(Debug, Clone)]
pub struct Call {
    pub args: Vec<String>,
    pub workdir: Option<PathBuf>,
    pub stdin: Option<Vec<u8>>,
}

type ExitCodeFn = Rc<dyn Fn(&[String]) -> i32>;

pub struct FakeEnvironment {
    context: EnvContext,
    calls: Rc<RefCell<Vec<Call>>>,
    exit_code: ExitCodeFn,
}

impl FakeEnvironment {
    pub fn new(env_dir: &str, exit_code: impl Fn(&[String]) -> i32 + 'static) -> Self {
        Self {
            context: EnvContext::new(PathBuf::from(env_dir), String::new()),
            calls: Rc::default(),
            exit_code: Rc::new(exit_code),
        }
    }

    pub fn succeeding(env_dir: &str) -> Self {
        Self::new(env_dir, |_| 0)
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }
}

impl Environment for FakeEnvironment {
    fn context(&self) -> &EnvContext {
        &self.context
    }

    fn execute(&self, executable: &dyn EnvironmentExecutable) -> Result<ExitStatus, Error> {
        let args: Vec<String> = executable
            .get_args()
            .iter()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        let code = (self.exit_code)(&args);

        self.calls.borrow_mut().push(Call {
            args,
            workdir: executable.get_workdir().map(Path::to_path_buf),
            stdin: executable.get_stdin().map(<[u8]>::to_vec),
        });

        Ok(exit_status(code))
    }
}

/// Creates the target directory and hands out `FakeEnvironment`s sharing one call log
pub struct FakeCreator {
    calls: Rc<RefCell<Vec<Call>>>,
    exit_code: ExitCodeFn,
    created: RefCell<Vec<(PathBuf, CreateOptions)>>,
}

impl FakeCreator {
    pub fn new(exit_code: impl Fn(&[String]) -> i32 + 'static) -> Self {
        Self {
            calls: Rc::default(),
            exit_code: Rc::new(exit_code),
            created: RefCell::default(),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    /// The argument lists of all calls, for comparing whole sequences
    pub fn call_args(&self) -> Vec<Vec<String>> {
        self.calls().into_iter().map(|c| c.args).collect()
    }

    pub fn created(&self) -> Vec<(PathBuf, CreateOptions)> {
        self.created.borrow().clone()
    }
}

impl EnvironmentCreator for FakeCreator {
    fn create(&self, target: &Path, options: &CreateOptions) -> Result<Box<dyn Environment>, Error> {
        create_dir_all(target)?;
        self.created
            .borrow_mut()
            .push((target.to_path_buf(), options.clone()));

        Ok(Box::new(FakeEnvironment {
            context: EnvContext::new(target.to_path_buf(), options.prompt.clone()),
            calls: self.calls.clone(),
            exit_code: self.exit_code.clone(),
        }))
    }
}

/// Serves fixed chunks through a `LimitedBuffer`, like the CURL fetcher does
pub struct FakeFetcher {
    chunks: Vec<Vec<u8>>,
    limit: usize,
    fetches: Cell<usize>,
}

impl Default for FakeFetcher {
    fn default() -> Self {
        Self::with_chunks(Vec::new())
    }
}

impl FakeFetcher {
    pub fn with_chunks(chunks: Vec<Vec<u8>>) -> Self {
        Self {
            chunks,
            limit: DOWNLOAD_LIMIT,
            fetches: Cell::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.get()
    }
}

impl ScriptFetcher for FakeFetcher {
    fn fetch(&self, url: &str, _verbose: bool) -> Result<Vec<u8>, Error> {
        self.fetches.set(self.fetches.get() + 1);

        let mut buffer = LimitedBuffer::new(self.limit);
        for chunk in &self.chunks {
            if !buffer.push(chunk) {
                break;
            }
        }

        buffer.finish(url).e_context(|| format!("Fetching {url}"))
    }
}
